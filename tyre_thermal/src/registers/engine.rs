//! Bus-side state machine over the register map.

use crate::detection::WarningFlags;

use super::snapshot::{RegisterSnapshot, FRAME_STREAM_LEN};
use super::{reg, Command, OutputMode, PendingCommands, RegisterMap};

/// Protocol state between bus events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusState {
    /// No register latched; the next written byte is an address.
    #[default]
    Idle,
    Addressed { pointer: u8 },
}

/// Streaming read window over the published frame.
///
/// Latching [`reg::FRAME_STREAM`] copies the latest published frame in, so one
/// transaction always reads a single frame.
#[derive(Debug, Clone)]
struct StreamWindow {
    bytes: [u8; FRAME_STREAM_LEN],
    len: usize,
    offset: usize,
}

impl StreamWindow {
    fn empty() -> Self {
        Self {
            bytes: [0; FRAME_STREAM_LEN],
            len: 0,
            offset: 0,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.offset >= self.len {
            return 0;
        }
        let value = self.bytes[self.offset];
        self.offset += 1;
        value
    }
}

/// Register map plus the byte-level protocol a bus host drives.
///
/// Bus side calls [`on_write`](Self::on_write), [`on_read`](Self::on_read) and
/// [`on_stop`](Self::on_stop). The cycle driver calls
/// [`apply_snapshot`](Self::apply_snapshot) and [`take_pending`](Self::take_pending).
#[derive(Debug, Clone)]
pub struct RegisterEngine {
    map: RegisterMap,
    state: BusState,
    bus_address: u8,
    pending_address: Option<u8>,
    pending: PendingCommands,
    published: Option<[u8; FRAME_STREAM_LEN]>,
    window: StreamWindow,
}

impl Default for RegisterEngine {
    fn default() -> Self {
        Self::new(super::DEFAULT_BUS_ADDRESS)
    }
}

impl RegisterEngine {
    pub fn new(bus_address: u8) -> Self {
        let bus_address = bus_address & 0x7F;
        Self {
            map: RegisterMap::with_bus_address(bus_address),
            state: BusState::Idle,
            bus_address,
            pending_address: None,
            pending: PendingCommands::default(),
            published: None,
            window: StreamWindow::empty(),
        }
    }

    // ------------------------------------------------------------------------
    // Bus events
    // ------------------------------------------------------------------------

    /// A byte written by the host.
    pub fn on_write(&mut self, byte: u8) {
        match self.state {
            BusState::Idle => self.latch(byte),
            BusState::Addressed { pointer } if pointer == reg::COMMAND => {
                self.execute(byte);
                self.state = BusState::Idle;
            }
            BusState::Addressed { pointer } => {
                if RegisterMap::is_writable(pointer) {
                    self.map.set(pointer, byte);
                    if pointer == reg::BUS_ADDRESS {
                        self.pending_address = Some(byte & 0x7F);
                    }
                } else {
                    tracing::trace!(pointer, byte, "write to read-only register ignored");
                }
                self.latch(pointer.wrapping_add(1));
            }
        }
    }

    /// A byte requested by the host.
    pub fn on_read(&mut self) -> u8 {
        match self.state {
            BusState::Idle => 0,
            BusState::Addressed { pointer } if pointer == reg::FRAME_STREAM => {
                self.window.next_byte()
            }
            BusState::Addressed { pointer } => {
                let value = if pointer == reg::COMMAND {
                    0
                } else {
                    self.map.get(pointer)
                };
                self.latch(pointer.wrapping_add(1));
                value
            }
        }
    }

    /// End of transaction.
    pub fn on_stop(&mut self) {
        self.state = BusState::Idle;
        if let Some(address) = self.pending_address.take() {
            if address != self.bus_address {
                tracing::info!(
                    from = self.bus_address,
                    to = address,
                    "bus address changed"
                );
            }
            self.bus_address = address;
        }
    }

    /// Points at `pointer`; landing on the stream window primes it with the latest frame.
    fn latch(&mut self, pointer: u8) {
        if pointer == reg::FRAME_STREAM {
            match &self.published {
                Some(frame) => {
                    self.window.bytes = *frame;
                    self.window.len = FRAME_STREAM_LEN;
                }
                None => self.window.len = 0,
            }
            self.window.offset = 0;
        }
        self.state = BusState::Addressed { pointer };
    }

    fn execute(&mut self, byte: u8) {
        let Some(command) = Command::from_repr(byte) else {
            tracing::warn!(byte, "unknown bus command ignored");
            return;
        };
        if command == Command::ClearWarnings {
            self.map.set(reg::WARNINGS, WarningFlags::empty().bits());
        }
        tracing::debug!(%command, "bus command");
        self.pending.raise(command);
    }

    // ------------------------------------------------------------------------
    // Host-side convenience
    // ------------------------------------------------------------------------

    /// Runs a complete write transaction: address byte, data bytes, stop.
    pub fn write_transaction(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.on_write(byte);
        }
        self.on_stop();
    }

    /// Runs a complete read transaction starting at `address`, filling `buf`.
    pub fn read_transaction(&mut self, address: u8, buf: &mut [u8]) {
        self.on_write(address);
        for byte in buf.iter_mut() {
            *byte = self.on_read();
        }
        self.on_stop();
    }

    // ------------------------------------------------------------------------
    // Cycle side
    // ------------------------------------------------------------------------

    /// Installs one cycle's output. Bus state and the config region are untouched.
    pub fn apply_snapshot(&mut self, snapshot: &RegisterSnapshot) {
        for (address, value) in snapshot.registers() {
            self.map.set(address, value);
        }
        self.published = Some(snapshot.stream);
    }

    /// Commands raised since the last call.
    pub fn take_pending(&mut self) -> PendingCommands {
        std::mem::take(&mut self.pending)
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn state(&self) -> BusState {
        self.state
    }

    /// Address the transport should answer to.
    pub fn bus_address(&self) -> u8 {
        self.bus_address
    }

    pub fn emissivity(&self) -> f32 {
        self.map.emissivity()
    }

    pub fn raw_mode(&self) -> bool {
        self.map.raw_mode()
    }

    pub fn fallback_mode(&self) -> bool {
        self.map.fallback_mode()
    }

    pub fn output_mode(&self) -> Option<OutputMode> {
        self.map.output_mode()
    }

    /// Whether results should go out over `channel` in the configured mode.
    pub fn output_enabled(&self, channel: OutputMode) -> bool {
        match self.output_mode() {
            Some(OutputMode::All) => true,
            Some(mode) => mode == channel,
            None => false,
        }
    }
}
