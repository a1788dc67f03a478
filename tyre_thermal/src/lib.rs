//! Tyre Thermal - lateral tyre temperature profiling for a 32x24 thermal array.
//!
//! This library turns one thermal frame per acquisition cycle into a stabilized
//! estimate of where the tyre sits across the sensor and how hot each third of it is:
//! - Hot-pixel repair, per-column robust profile, spatial median and EMA filtering
//! - Uniform-scene gate and dual-criterion region growing from a fixed seed column
//! - Geometry, temporal-change and persistence constraints on the detected span
//! - Per-zone statistics, lateral gradient and confidence
//! - A 256-byte register map served over a byte-oriented bus protocol
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tyre_thermal::{DetectionConfig, TyreDetector};
//!
//! let mut detector = TyreDetector::from_config(DetectionConfig::default())?;
//! let result = detector.process(&frame);
//!
//! println!("span {:?}, centre median {:.1}", result.detection.span, result.centre.median);
//! ```

pub mod config;
pub mod detection;
pub mod driver;
pub mod frame;
pub(crate) mod math;
pub mod registers;
pub mod serializer;
pub mod source;
pub mod synthetic;

// ============================================================================
// Sensor geometry and frames
// ============================================================================

pub use frame::{Profile, ThermalFrame, LAST_COLUMN, SENSOR_HEIGHT, SENSOR_PIXELS, SENSOR_WIDTH};

// ============================================================================
// Detection
// ============================================================================

pub use config::{ConfigError, DetectionConfig};
pub use detection::{
    Diagnostics, EdgeClip, FrameResult, Span, TemporalState, TyreDetection, TyreDetector,
    WarningFlags, ZoneStats,
};

// ============================================================================
// Register bus
// ============================================================================

pub use registers::{
    BusState, Command, OutputMode, PendingCommands, RegisterEngine, RegisterMap,
    RegisterSnapshot, SharedRegisters,
};

// ============================================================================
// External collaborators and the cycle driver
// ============================================================================

pub use driver::{CycleOutcome, Driver, DriverConfig, OutputFormat};
pub use serializer::{CompactCsvSerializer, FrameSerializer, JsonSerializer, SerializeError};
pub use source::{SensorError, ThermalSource};
