//! Runs the tyre detection driver against a synthetic sensor, with a simulated bus host
//! polling the register map from a second thread.
//!
//! Serialized frames go to stdout; logs go to `logs/` and warnings also to stderr.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tyre_sim -- [config.yaml] [--frames N] [--json] [--profile]
//! ```
//!
//! The optional config file (YAML or JSON) holds a `driver` section
//! ([`DriverConfig`]) and a `scene` section ([`SyntheticScene`]); missing keys fall
//! back to defaults.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tyre_thermal::registers::{reg, Command};
use tyre_thermal::synthetic::{SyntheticScene, SyntheticSource};
use tyre_thermal::{
    CompactCsvSerializer, CycleOutcome, Driver, DriverConfig, FrameSerializer, JsonSerializer,
    OutputFormat, SharedRegisters, WarningFlags,
};

const DEFAULT_FRAMES: u64 = 200;
const HOST_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SimConfig {
    driver: DriverConfig,
    scene: SyntheticScene,
    /// Sleep between acquisition cycles.
    cycle_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            scene: SyntheticScene::default(),
            cycle_ms: 125,
        }
    }
}

#[derive(Debug)]
struct Args {
    config_path: Option<String>,
    frames: u64,
    json: bool,
    profile: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: None,
        frames: DEFAULT_FRAMES,
        json: false,
        profile: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().context("--frames needs a value")?;
                args.frames = value
                    .parse()
                    .with_context(|| format!("invalid frame count: {}", value))?;
            }
            "--json" => args.json = true,
            "--profile" => args.profile = true,
            flag if flag.starts_with("--") => bail!("unknown flag: {}", flag),
            path => {
                if args.config_path.replace(path.to_string()).is_some() {
                    bail!("only one config file may be given");
                }
            }
        }
    }

    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };

    let format = common::FileFormat::from_file_name(path)?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    let config: SimConfig = common::deserialize(&text, format)
        .with_context(|| format!("failed to parse {}", path))?;
    Ok(config)
}

fn main() -> Result<()> {
    common::log_setup::setup_logging(&common::log_setup::LogOptions::new("info", "tyre_sim"))
        .context("failed to set up logging")?;

    let args = parse_args()?;
    let mut config = load_config(args.config_path.as_deref())?;
    if args.json {
        config.driver.output_format = OutputFormat::Json;
    }
    config.driver.include_profile |= args.profile;

    let serializer: Box<dyn FrameSerializer + Send> = match config.driver.output_format {
        OutputFormat::Compact => Box::new(CompactCsvSerializer::new(std::io::stdout())),
        OutputFormat::Json => Box::new(JsonSerializer::new(std::io::stdout())),
    };

    let source = SyntheticSource::new(config.scene.clone());
    let mut driver = Driver::new(source, config.driver.clone())
        .context("invalid driver configuration")?
        .with_serializer(serializer);

    tracing::info!(
        frames = args.frames,
        cycle_ms = config.cycle_ms,
        format = ?config.driver.output_format,
        "starting simulation"
    );

    let running = Arc::new(AtomicBool::new(true));
    let host = {
        let registers = driver.registers();
        let running = running.clone();
        thread::spawn(move || run_host(registers, running))
    };

    let cycle = Duration::from_millis(config.cycle_ms);
    let mut published = 0u64;
    let mut unavailable = 0u64;
    for _ in 0..args.frames {
        match driver.run_cycle() {
            CycleOutcome::Published(_) => published += 1,
            CycleOutcome::FrameUnavailable => unavailable += 1,
        }
        thread::sleep(cycle);
    }

    running.store(false, Ordering::Relaxed);
    if host.join().is_err() {
        bail!("bus host thread panicked");
    }

    tracing::info!(published, unavailable, "simulation finished");
    Ok(())
}

/// Plays the part of a bus master: polls status and temperatures, lowers the emissivity
/// once, and clears warnings every so often.
fn run_host(registers: SharedRegisters, running: Arc<AtomicBool>) {
    let mut poll = 0u64;
    while running.load(Ordering::Relaxed) {
        thread::sleep(HOST_POLL_INTERVAL);
        poll += 1;

        let mut status = [0u8; (reg::POLARITY - reg::FIRMWARE_VERSION + 1) as usize];
        let mut temperatures = [0u8; (reg::LATERAL_GRADIENT - reg::LEFT_MEDIAN + 2) as usize];
        {
            let mut engine = registers.lock();
            engine.read_transaction(reg::FIRMWARE_VERSION, &mut status);
            engine.read_transaction(reg::LEFT_MEDIAN, &mut temperatures);
        }

        let status_at = |address: u8| status[(address - reg::FIRMWARE_VERSION) as usize];
        let tenths_at = |address: u8| {
            let i = (address - reg::LEFT_MEDIAN) as usize;
            i16::from_le_bytes([temperatures[i], temperatures[i + 1]]) as f32 / 10.0
        };

        let frame_number = u16::from_le_bytes([
            status_at(reg::FRAME_NUMBER_L),
            status_at(reg::FRAME_NUMBER_H),
        ]);
        let warnings = WarningFlags::from_bits_truncate(status_at(reg::WARNINGS));
        tracing::info!(
            frame = frame_number,
            fps = status_at(reg::FPS),
            detected = status_at(reg::DETECTED),
            confidence = status_at(reg::CONFIDENCE),
            span_start = status_at(reg::SPAN_START),
            span_end = status_at(reg::SPAN_END),
            left = tenths_at(reg::LEFT_MEDIAN),
            centre = tenths_at(reg::CENTRE_MEDIAN),
            right = tenths_at(reg::RIGHT_MEDIAN),
            gradient = tenths_at(reg::LATERAL_GRADIENT),
            ?warnings,
            "host poll"
        );

        if poll == 8 {
            tracing::info!("host lowering emissivity to 0.90");
            registers.lock().write_transaction(&[reg::EMISSIVITY, 90]);
        }
        if poll % 20 == 0 && !warnings.is_empty() {
            registers
                .lock()
                .write_transaction(&[reg::COMMAND, Command::ClearWarnings as u8]);
        }
    }
}
