//! Configuration for the tyre detection pipeline.
//!
//! [`DetectionConfig`] is a flat struct; parameters are grouped by comments into the
//! pipeline stage that consumes them. Defaults are tuned for a 32x24 array looking
//! down at a tyre tread from roughly 20 cm.

use serde::{Deserialize, Serialize};

use crate::detection::SPAN_HISTORY_LEN;
use crate::frame::{SENSOR_HEIGHT, SENSOR_WIDTH};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("min_temp ({min_temp}) must be below max_temp ({max_temp})")]
    TemperatureRange { min_temp: f32, max_temp: f32 },
    #[error("min_width ({min_width}) must not exceed max_width ({max_width})")]
    WidthRange { min_width: usize, max_width: usize },
    #[error("region of interest rows {start}..{end} do not fit the sensor height {height}")]
    RoiOutOfBounds {
        start: usize,
        end: usize,
        height: usize,
    },
    #[error("seed column {0} is outside the sensor")]
    SeedOutOfBounds(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    // Region of interest
    /// First sensor row of the band that crosses the tread.
    pub roi_start_row: usize,
    /// Number of rows in the band.
    pub roi_rows: usize,

    // Temperature limits
    pub min_temp: f32,
    pub max_temp: f32,
    /// Pixels above this are treated as reflections (brake plume, exhaust) and repaired.
    pub saturation_threshold: f32,

    // Robust thresholds
    /// Global MAD below which the scene is considered uniform (no tyre).
    pub mad_uniform_threshold: f32,
    pub k_floor: f32,
    pub k_multiplier: f32,
    pub delta_floor: f32,
    pub delta_multiplier: f32,

    // Region growing
    /// Consecutive rejected columns tolerated before growth stops.
    pub max_fail_count: usize,
    pub seed_column: usize,

    // Geometry constraints
    pub min_width: usize,
    pub max_width: usize,
    pub max_width_change_ratio: f32,

    // Temporal smoothing
    pub ema_alpha: f32,
    pub persistence_frames: usize,

    // Warnings
    pub high_gradient_warning: f32,
    pub high_variance_warning: f32,
    pub low_confidence_warning: f32,
    pub zone_diff_warning: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            roi_start_row: 10,
            roi_rows: 4,

            min_temp: 0.0,
            max_temp: 180.0,
            saturation_threshold: 180.0,

            mad_uniform_threshold: 0.5,
            k_floor: 5.0,
            k_multiplier: 2.0,
            delta_floor: 3.0,
            delta_multiplier: 1.8,

            max_fail_count: 2,
            seed_column: 16,

            min_width: 6,
            max_width: 28,
            max_width_change_ratio: 0.3,

            ema_alpha: 0.3,
            persistence_frames: 2,

            high_gradient_warning: 10.0,
            high_variance_warning: 20.0,
            low_confidence_warning: 0.5,
            zone_diff_warning: 5.0,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let roi_end = self.roi_start_row + self.roi_rows;
        if self.roi_rows == 0 || roi_end > SENSOR_HEIGHT {
            return Err(ConfigError::RoiOutOfBounds {
                start: self.roi_start_row,
                end: roi_end,
                height: SENSOR_HEIGHT,
            });
        }

        if !(self.min_temp < self.max_temp) {
            return Err(ConfigError::TemperatureRange {
                min_temp: self.min_temp,
                max_temp: self.max_temp,
            });
        }

        if self.seed_column >= SENSOR_WIDTH {
            return Err(ConfigError::SeedOutOfBounds(self.seed_column));
        }

        if self.min_width > self.max_width {
            return Err(ConfigError::WidthRange {
                min_width: self.min_width,
                max_width: self.max_width,
            });
        }

        check_range("min_width", self.min_width as f32, 1.0, SENSOR_WIDTH as f32)?;
        check_range("max_width", self.max_width as f32, 1.0, SENSOR_WIDTH as f32)?;
        check_range("ema_alpha", self.ema_alpha, f32::MIN_POSITIVE, 1.0)?;
        check_range(
            "persistence_frames",
            self.persistence_frames as f32,
            1.0,
            SPAN_HISTORY_LEN as f32,
        )?;
        check_range(
            "max_width_change_ratio",
            self.max_width_change_ratio,
            0.0,
            1.0,
        )?;
        check_range(
            "mad_uniform_threshold",
            self.mad_uniform_threshold,
            0.0,
            f32::MAX,
        )?;
        check_range("k_floor", self.k_floor, 0.0, f32::MAX)?;
        check_range("k_multiplier", self.k_multiplier, 0.0, f32::MAX)?;
        check_range("delta_floor", self.delta_floor, 0.0, f32::MAX)?;
        check_range("delta_multiplier", self.delta_multiplier, 0.0, f32::MAX)?;
        check_range(
            "low_confidence_warning",
            self.low_confidence_warning,
            0.0,
            1.0,
        )?;

        Ok(())
    }

    #[inline]
    pub fn roi_rows(&self) -> std::ops::Range<usize> {
        self.roi_start_row..self.roi_start_row + self.roi_rows
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    // Negated so NaN fails too.
    if !(value >= min && value <= max) {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
