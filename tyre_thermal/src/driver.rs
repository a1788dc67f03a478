//! The per-cycle loop tying source, detector, registers and serializer together.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, DetectionConfig};
use crate::detection::{FrameResult, TyreDetector, WarningFlags};
use crate::registers::{
    OutputMode, RegisterEngine, RegisterSnapshot, SharedRegisters, DEFAULT_BUS_ADDRESS,
};
use crate::serializer::FrameSerializer;
use crate::source::ThermalSource;

/// Serial encoding selected for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub detection: DetectionConfig,
    pub output_format: OutputFormat,
    /// Append the filtered column profile to every serialized frame.
    pub include_profile: bool,
    /// Initial 7-bit bus address.
    pub bus_address: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            output_format: OutputFormat::default(),
            include_profile: false,
            bus_address: DEFAULT_BUS_ADDRESS,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detection.validate()?;
        if self.bus_address > 0x7F {
            return Err(ConfigError::OutOfRange {
                name: "bus_address",
                value: self.bus_address as f32,
                min: 0.0,
                max: 127.0,
            });
        }
        Ok(())
    }
}

/// What one cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Published(FrameResult),
    /// The source delivered nothing; temporal state is untouched.
    FrameUnavailable,
}

/// Runs one acquisition cycle at a time.
///
/// Bus commands are consumed at the start of each cycle; results are published into the
/// shared registers and, when the output mode includes serial, handed to the serializer.
pub struct Driver<S: ThermalSource> {
    source: S,
    detector: TyreDetector,
    registers: SharedRegisters,
    serializer: Option<Box<dyn FrameSerializer + Send>>,
    include_profile: bool,
    missed_frames: u32,
    last_frame_at: Option<Instant>,
    fps: f32,
}

impl<S: ThermalSource> Driver<S> {
    pub fn new(source: S, config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            detector: TyreDetector::from_config(config.detection)?,
            registers: SharedRegisters::new(RegisterEngine::new(config.bus_address)),
            serializer: None,
            include_profile: config.include_profile,
            missed_frames: 0,
            last_frame_at: None,
            fps: 0.0,
        })
    }

    pub fn with_serializer(mut self, serializer: Box<dyn FrameSerializer + Send>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Handle for the bus side.
    pub fn registers(&self) -> SharedRegisters {
        self.registers.clone()
    }

    pub fn detector(&self) -> &TyreDetector {
        &self.detector
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Frames missed since the last published result.
    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    /// Rate measured over the most recent pair of delivered frames.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn run_cycle(&mut self) -> CycleOutcome {
        // Step 1: Commands and host configuration, under one short lock
        let (pending, emissivity, fallback_mode, raw_mode, serial_enabled) = {
            let mut engine = self.registers.lock();
            (
                engine.take_pending(),
                engine.emissivity(),
                engine.fallback_mode(),
                engine.raw_mode(),
                engine.output_enabled(OutputMode::Serial),
            )
        };

        if pending.reset {
            tracing::info!("reset requested over the bus");
            self.detector.reset();
            self.missed_frames = 0;
            self.last_frame_at = None;
        }
        if pending.clear_warnings {
            self.missed_frames = 0;
        }
        if pending.frame_request {
            tracing::debug!("frame requested over the bus");
        }

        // Step 2: Acquire
        self.source.set_emissivity(emissivity);
        let frame = match self.source.get_frame() {
            Ok(frame) => frame,
            Err(err) => {
                self.missed_frames = self.missed_frames.saturating_add(1);
                tracing::warn!(missed = self.missed_frames, "frame unavailable: {}", err);
                return CycleOutcome::FrameUnavailable;
            }
        };

        // Step 3: Detect
        let mut result = self.detector.process(&frame);
        if self.missed_frames > 0 {
            result.warnings |= WarningFlags::SENSOR_UNAVAILABLE;
            self.missed_frames = 0;
        }

        let now = Instant::now();
        if let Some(previous) = self.last_frame_at {
            let elapsed = now.duration_since(previous).as_secs_f32();
            if elapsed > 0.0 {
                self.fps = 1.0 / elapsed;
            }
        }
        self.last_frame_at = Some(now);

        // Step 4: Publish
        let snapshot = RegisterSnapshot::build(
            &result,
            &frame,
            self.fps,
            fallback_mode,
            raw_mode,
            self.detector.config().roi_rows(),
        );
        self.registers.publish(&snapshot);

        // Step 5: Serialize
        if serial_enabled {
            if let Some(serializer) = self.serializer.as_mut() {
                let profile = self.include_profile.then_some(&result.profile);
                if let Err(err) = serializer.write_frame(&result, self.fps, profile) {
                    tracing::warn!("failed to serialize frame {}: {}", result.frame_number, err);
                }
            }
        }

        CycleOutcome::Published(result)
    }
}
