//! Sensor geometry and the raw frame container.

use std::ops::{Index, IndexMut};

use crate::source::SensorError;

pub const SENSOR_WIDTH: usize = 32;
pub const SENSOR_HEIGHT: usize = 24;
pub const SENSOR_PIXELS: usize = SENSOR_WIDTH * SENSOR_HEIGHT;
pub const LAST_COLUMN: usize = SENSOR_WIDTH - 1;

/// One temperature per sensor column.
pub type Profile = [f32; SENSOR_WIDTH];

/// One acquisition: absolute temperatures in °C, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalFrame {
    pixels: [f32; SENSOR_PIXELS],
}

impl ThermalFrame {
    pub fn new(pixels: [f32; SENSOR_PIXELS]) -> Self {
        Self { pixels }
    }

    pub fn filled(value: f32) -> Self {
        Self {
            pixels: [value; SENSOR_PIXELS],
        }
    }

    /// Builds a frame from a `(column, row) -> °C` function.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut pixels = [0.0; SENSOR_PIXELS];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = f(i % SENSOR_WIDTH, i / SENSOR_WIDTH);
        }
        Self { pixels }
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f32 {
        debug_assert!(col < SENSOR_WIDTH && row < SENSOR_HEIGHT);
        self.pixels[row * SENSOR_WIDTH + col]
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        debug_assert!(col < SENSOR_WIDTH && row < SENSOR_HEIGHT);
        self.pixels[row * SENSOR_WIDTH + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.pixels[row * SENSOR_WIDTH..(row + 1) * SENSOR_WIDTH]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.pixels[row * SENSOR_WIDTH..(row + 1) * SENSOR_WIDTH]
    }

    #[inline]
    pub fn pixels(&self) -> &[f32; SENSOR_PIXELS] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [f32; SENSOR_PIXELS] {
        &mut self.pixels
    }
}

impl Default for ThermalFrame {
    fn default() -> Self {
        Self::filled(0.0)
    }
}

impl TryFrom<&[f32]> for ThermalFrame {
    type Error = SensorError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        let pixels: [f32; SENSOR_PIXELS] =
            values.try_into().map_err(|_| SensorError::FrameSize {
                expected: SENSOR_PIXELS,
                actual: values.len(),
            })?;
        Ok(Self { pixels })
    }
}

impl Index<(usize, usize)> for ThermalFrame {
    type Output = f32;

    #[inline]
    fn index(&self, (col, row): (usize, usize)) -> &Self::Output {
        &self.pixels[row * SENSOR_WIDTH + col]
    }
}

impl IndexMut<(usize, usize)> for ThermalFrame {
    #[inline]
    fn index_mut(&mut self, (col, row): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[row * SENSOR_WIDTH + col]
    }
}
