//! Register map and the byte-addressed bus protocol served over it.
//!
//! The address table is a wire contract; field positions never move.
//!
//! | Range       | Region        | Access                               |
//! |-------------|---------------|--------------------------------------|
//! | 0x00..=0x0F | configuration | read-write                           |
//! | 0x10..=0x1A | status        | read-only                            |
//! | 0x20..=0x2D | temperatures  | read-only, i16 LE tenths of °C       |
//! | 0x30..=0x4F | raw channels  | read-only, i16 LE, raw mode only     |
//! | 0x50        | frame stream  | read-only window over 1536 bytes     |
//! | 0xFF        | command       | write-only, one-shot                 |

mod engine;
mod shared;
mod snapshot;


use strum_macros::{Display, EnumIter, FromRepr};

pub use engine::{BusState, RegisterEngine};
pub use shared::SharedRegisters;
pub use snapshot::{RegisterSnapshot, FRAME_STREAM_LEN};

/// Register addresses.
pub mod reg {
    // Configuration
    pub const BUS_ADDRESS: u8 = 0x00;
    pub const OUTPUT_MODE: u8 = 0x01;
    pub const FRAME_RATE: u8 = 0x02;
    pub const FALLBACK_MODE: u8 = 0x03;
    pub const EMISSIVITY: u8 = 0x04;
    pub const RAW_MODE: u8 = 0x05;
    pub const CONFIG_END: u8 = 0x0F;

    // Status
    pub const FIRMWARE_VERSION: u8 = 0x10;
    pub const FRAME_NUMBER_L: u8 = 0x11;
    pub const FRAME_NUMBER_H: u8 = 0x12;
    pub const FPS: u8 = 0x13;
    pub const DETECTED: u8 = 0x14;
    pub const CONFIDENCE: u8 = 0x15;
    pub const TYRE_WIDTH: u8 = 0x16;
    pub const SPAN_START: u8 = 0x17;
    pub const SPAN_END: u8 = 0x18;
    pub const WARNINGS: u8 = 0x19;
    pub const POLARITY: u8 = 0x1A;

    // Temperatures
    pub const LEFT_MEDIAN: u8 = 0x20;
    pub const CENTRE_MEDIAN: u8 = 0x22;
    pub const RIGHT_MEDIAN: u8 = 0x24;
    pub const LEFT_AVG: u8 = 0x26;
    pub const CENTRE_AVG: u8 = 0x28;
    pub const RIGHT_AVG: u8 = 0x2A;
    pub const LATERAL_GRADIENT: u8 = 0x2C;

    pub const RAW_CHANNELS: u8 = 0x30;
    pub const FRAME_STREAM: u8 = 0x50;
    pub const COMMAND: u8 = 0xFF;
}

pub const FIRMWARE_VERSION: u8 = 0x01;
pub const DEFAULT_BUS_ADDRESS: u8 = 0x08;
pub const DEFAULT_EMISSIVITY_PERCENT: u8 = 95;
pub const RAW_CHANNEL_COUNT: usize = 16;
pub const REGISTER_COUNT: usize = 256;

/// Where the serialized result goes each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum OutputMode {
    Serial = 0x00,
    Bus = 0x01,
    /// Reserved, no transport behind it.
    Can = 0x02,
    All = 0xFF,
}

/// One-shot actions written to [`reg::COMMAND`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum Command {
    Reset = 0x01,
    ClearWarnings = 0x02,
    FrameRequest = 0x10,
}

/// Commands raised on the bus side, consumed by the cycle driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCommands {
    pub reset: bool,
    pub clear_warnings: bool,
    pub frame_request: bool,
}

impl PendingCommands {
    pub fn is_empty(&self) -> bool {
        !(self.reset || self.clear_warnings || self.frame_request)
    }

    pub(crate) fn raise(&mut self, command: Command) {
        match command {
            Command::Reset => self.reset = true,
            Command::ClearWarnings => self.clear_warnings = true,
            Command::FrameRequest => self.frame_request = true,
        }
    }
}

/// The 256-byte image a bus host reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap {
    bytes: [u8; REGISTER_COUNT],
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::with_bus_address(DEFAULT_BUS_ADDRESS)
    }
}

impl RegisterMap {
    pub fn with_bus_address(address: u8) -> Self {
        let mut bytes = [0u8; REGISTER_COUNT];
        bytes[reg::BUS_ADDRESS as usize] = address & 0x7F;
        bytes[reg::OUTPUT_MODE as usize] = OutputMode::Serial as u8;
        bytes[reg::EMISSIVITY as usize] = DEFAULT_EMISSIVITY_PERCENT;
        bytes[reg::FIRMWARE_VERSION as usize] = FIRMWARE_VERSION;
        Self { bytes }
    }

    #[inline]
    pub fn get(&self, address: u8) -> u8 {
        self.bytes[address as usize]
    }

    #[inline]
    pub(crate) fn set(&mut self, address: u8, value: u8) {
        self.bytes[address as usize] = value;
    }

    pub fn get_i16(&self, address: u8) -> i16 {
        i16::from_le_bytes([self.get(address), self.get(address.wrapping_add(1))])
    }

    pub(crate) fn set_i16(&mut self, address: u8, value: i16) {
        let [lo, hi] = value.to_le_bytes();
        self.set(address, lo);
        self.set(address.wrapping_add(1), hi);
    }

    pub fn get_u16(&self, address: u8) -> u16 {
        u16::from_le_bytes([self.get(address), self.get(address.wrapping_add(1))])
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_COUNT] {
        &self.bytes
    }

    #[inline]
    pub fn is_writable(address: u8) -> bool {
        address <= reg::CONFIG_END
    }

    /// Emissivity as 0.0..=1.0; bytes above 100 read as 1.0.
    pub fn emissivity(&self) -> f32 {
        self.get(reg::EMISSIVITY).min(100) as f32 / 100.0
    }

    pub fn raw_mode(&self) -> bool {
        self.get(reg::RAW_MODE) != 0
    }

    pub fn fallback_mode(&self) -> bool {
        self.get(reg::FALLBACK_MODE) == 1
    }

    /// `None` for a byte that names no mode.
    pub fn output_mode(&self) -> Option<OutputMode> {
        OutputMode::from_repr(self.get(reg::OUTPUT_MODE))
    }

    pub fn frame_rate(&self) -> u8 {
        self.get(reg::FRAME_RATE)
    }
}
