//! The acquisition seam: where frames come from.

use std::time::Duration;

use crate::frame::ThermalFrame;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorError {
    #[error("no frame within {0:?}")]
    Timeout(Duration),
    #[error("sensor bus error: {0}")]
    Bus(String),
    #[error("frame has {actual} pixels, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}

/// A calibrated thermal array.
///
/// `get_frame` is a bounded wait: it either delivers the next frame in °C or reports
/// why it could not. Retry policy belongs to the caller.
pub trait ThermalSource {
    fn get_frame(&mut self) -> Result<ThermalFrame, SensorError>;

    /// Called before each acquisition with the emissivity the host configured.
    fn set_emissivity(&mut self, _emissivity: f32) {}
}

impl<S: ThermalSource + ?Sized> ThermalSource for Box<S> {
    fn get_frame(&mut self) -> Result<ThermalFrame, SensorError> {
        (**self).get_frame()
    }

    fn set_emissivity(&mut self, emissivity: f32) {
        (**self).set_emissivity(emissivity)
    }
}
