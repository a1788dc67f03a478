//! Synthetic thermal scenes for tests, benches and the simulator.

use std::collections::VecDeque;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::detection::Span;
use crate::frame::{Profile, ThermalFrame, LAST_COLUMN, SENSOR_HEIGHT, SENSOR_WIDTH};
use crate::source::{SensorError, ThermalSource};

const KELVIN: f32 = 273.15;

/// Every pixel at `temp`.
pub fn uniform_frame(temp: f32) -> ThermalFrame {
    ThermalFrame::filled(temp)
}

/// A vertical tyre band of `tyre` °C over `span` on a `background` floor.
pub fn tyre_frame(background: f32, tyre: f32, span: Span) -> ThermalFrame {
    ThermalFrame::from_fn(|col, _| {
        if span.columns().contains(&col) {
            tyre
        } else {
            background
        }
    })
}

/// A tyre over ground that is not perfectly flat.
///
/// The ground runs linearly from `ground.0` at column 0 to `ground.1` at the last column,
/// the tread from `tread.0` at `span.left` to `tread.1` at `span.right`. A flat floor
/// covering most of the sensor has zero global MAD and trips the uniformity gate, so
/// end-to-end scenes are built on a slope.
pub fn graded_tyre_frame(ground: (f32, f32), tread: (f32, f32), span: Span) -> ThermalFrame {
    let tread_run = (span.width() - 1).max(1) as f32;
    ThermalFrame::from_fn(|col, _| {
        if span.columns().contains(&col) {
            tread.0 + (tread.1 - tread.0) * (col - span.left) as f32 / tread_run
        } else {
            ground.0 + (ground.1 - ground.0) * col as f32 / LAST_COLUMN as f32
        }
    })
}

/// Every row equal to `profile`.
pub fn profile_frame(profile: &Profile) -> ThermalFrame {
    ThermalFrame::from_fn(|col, _| profile[col])
}

/// Scene parameters for [`SyntheticSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticScene {
    pub background: f32,
    /// Tread temperature at the centre of the tyre.
    pub tyre_temp: f32,
    /// Inner-to-outer shoulder difference across the tread (negative camber heats the left).
    pub camber_gradient: f32,
    pub tyre_left: usize,
    pub tyre_right: usize,
    /// Peak-to-peak uniform pixel noise.
    pub noise: f32,
    /// A reflection the preprocessor should repair, as `(column, row, °C)`.
    pub hot_pixel: Option<(usize, usize, f32)>,
    /// Every n-th acquisition times out; 0 never drops.
    pub drop_every: u64,
    /// Emissivity of the simulated rubber.
    pub surface_emissivity: f32,
    pub seed: u64,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            background: 28.0,
            tyre_temp: 65.0,
            camber_gradient: -6.0,
            tyre_left: 9,
            tyre_right: 24,
            noise: 0.6,
            hot_pixel: Some((4, 11, 260.0)),
            drop_every: 50,
            surface_emissivity: 0.95,
            seed: 42,
        }
    }
}

/// Deterministic noisy source for a static tyre.
///
/// Reported temperatures are corrected with the emissivity the host configured, so a
/// setting below the true surface emissivity reads hotter.
#[derive(Debug)]
pub struct SyntheticSource {
    scene: SyntheticScene,
    rng: ChaCha8Rng,
    acquisitions: u64,
    emissivity: f32,
}

impl SyntheticSource {
    pub fn new(scene: SyntheticScene) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(scene.seed),
            emissivity: scene.surface_emissivity,
            scene,
            acquisitions: 0,
        }
    }

    pub fn scene(&self) -> &SyntheticScene {
        &self.scene
    }

    fn true_temperature(&self, col: usize) -> f32 {
        let scene = &self.scene;
        if col < scene.tyre_left || col > scene.tyre_right {
            return scene.background;
        }
        let width = (scene.tyre_right - scene.tyre_left).max(1) as f32;
        let position = (col - scene.tyre_left) as f32 / width - 0.5;
        scene.tyre_temp + scene.camber_gradient * position
    }

    fn corrected(&self, true_celsius: f32) -> f32 {
        let kelvin = true_celsius + KELVIN;
        let radiance = self.scene.surface_emissivity * kelvin.powi(4);
        (radiance / self.emissivity).powf(0.25) - KELVIN
    }
}

impl ThermalSource for SyntheticSource {
    fn get_frame(&mut self) -> Result<ThermalFrame, SensorError> {
        self.acquisitions += 1;
        if self.scene.drop_every > 0 && self.acquisitions % self.scene.drop_every == 0 {
            return Err(SensorError::Timeout(Duration::from_millis(250)));
        }

        let mut profile = [0.0; SENSOR_WIDTH];
        for (col, t) in profile.iter_mut().enumerate() {
            *t = self.corrected(self.true_temperature(col));
        }

        let half_noise = self.scene.noise * 0.5;
        let mut frame = ThermalFrame::default();
        for row in 0..SENSOR_HEIGHT {
            for col in 0..SENSOR_WIDTH {
                let noise = if half_noise > 0.0 {
                    self.rng.random_range(-half_noise..half_noise)
                } else {
                    0.0
                };
                frame.set(col, row, profile[col] + noise);
            }
        }

        if let Some((col, row, temp)) = self.scene.hot_pixel {
            if col < SENSOR_WIDTH && row < SENSOR_HEIGHT {
                frame.set(col, row, temp);
            }
        }

        Ok(frame)
    }

    fn set_emissivity(&mut self, emissivity: f32) {
        if emissivity > 0.0 {
            self.emissivity = emissivity;
        }
    }
}

/// Replays a fixed sequence of acquisitions, then reports timeouts.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Result<ThermalFrame, SensorError>>,
    emissivity_log: Vec<f32>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Result<ThermalFrame, SensorError>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            emissivity_log: Vec::new(),
        }
    }

    /// Emissivity values pushed by the caller, one per acquisition.
    pub fn emissivity_log(&self) -> &[f32] {
        &self.emissivity_log
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl ThermalSource for ScriptedSource {
    fn get_frame(&mut self) -> Result<ThermalFrame, SensorError> {
        self.frames
            .pop_front()
            .unwrap_or(Err(SensorError::Timeout(Duration::ZERO)))
    }

    fn set_emissivity(&mut self, emissivity: f32) {
        self.emissivity_log.push(emissivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::float_ext::FloatExt;

    #[test]
    fn tyre_frame_fills_span_columns() {
        let frame = tyre_frame(25.0, 55.0, Span::new(12, 20));
        assert_eq!(frame.get(11, 0), 25.0);
        assert_eq!(frame.get(12, 23), 55.0);
        assert_eq!(frame.get(20, 10), 55.0);
        assert_eq!(frame.get(21, 10), 25.0);
    }

    #[test]
    fn graded_tyre_frame_ramps_ground_and_tread() {
        let frame = graded_tyre_frame((20.0, 30.0), (50.0, 55.5), Span::new(10, 21));
        assert_eq!(frame.get(0, 0), 20.0);
        assert_eq!(frame.get(LAST_COLUMN, 23), 30.0);
        assert_eq!(frame.get(10, 12), 50.0);
        assert_eq!(frame.get(12, 12), 51.0);
        assert_eq!(frame.get(21, 12), 55.5);
        assert!(frame.get(22, 12).within(27.097, 1e-3));
    }

    #[test]
    fn synthetic_source_is_deterministic() {
        let mut a = SyntheticSource::new(SyntheticScene::default());
        let mut b = SyntheticSource::new(SyntheticScene::default());
        assert_eq!(a.get_frame().unwrap(), b.get_frame().unwrap());
    }

    #[test]
    fn synthetic_source_drops_periodically() {
        let scene = SyntheticScene {
            drop_every: 3,
            ..Default::default()
        };
        let mut source = SyntheticSource::new(scene);
        assert!(source.get_frame().is_ok());
        assert!(source.get_frame().is_ok());
        assert!(matches!(source.get_frame(), Err(SensorError::Timeout(_))));
        assert!(source.get_frame().is_ok());
    }

    #[test]
    fn matching_emissivity_reports_true_temperature() {
        let scene = SyntheticScene {
            noise: 0.0,
            hot_pixel: None,
            ..Default::default()
        };
        let mut source = SyntheticSource::new(scene);
        let frame = source.get_frame().unwrap();
        assert!(frame.get(0, 0).within(28.0, 1e-3));

        source.set_emissivity(0.80);
        let hotter = source.get_frame().unwrap();
        assert!(hotter.get(16, 12) > frame.get(16, 12) + 5.0);
    }

    #[test]
    fn scripted_source_times_out_when_exhausted() {
        let mut source = ScriptedSource::new([Ok(uniform_frame(20.0))]);
        source.set_emissivity(0.95);
        assert!(source.get_frame().is_ok());
        assert!(source.get_frame().is_err());
        assert_eq!(source.emissivity_log(), &[0.95]);
    }
}
