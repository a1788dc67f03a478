use common::Shared;
use parking_lot::MutexGuard;

use super::{RegisterEngine, RegisterSnapshot};

/// Register engine shared between the cycle driver and the bus side.
///
/// A publish is applied under one lock, so each byte a host reads belongs to a single
/// publish. The per-byte `on_*` callbacks lock once per byte, so a multi-byte value read
/// through them may straddle a publish and mix two frames. A host that needs a
/// consistent view reads the whole span inside one [`lock`](Self::lock), e.g. with
/// `read_transaction`. The frame stream window is always consistent: it is copied when
/// its address is latched.
#[derive(Debug, Clone, Default)]
pub struct SharedRegisters {
    inner: Shared<RegisterEngine>,
}

impl SharedRegisters {
    pub fn new(engine: RegisterEngine) -> Self {
        Self {
            inner: Shared::new(engine),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, RegisterEngine> {
        self.inner.lock()
    }

    pub fn on_write(&self, byte: u8) {
        self.inner.lock().on_write(byte);
    }

    pub fn on_read(&self) -> u8 {
        self.inner.lock().on_read()
    }

    pub fn on_stop(&self) {
        self.inner.lock().on_stop();
    }

    /// Swaps a prebuilt snapshot in under one short lock.
    pub fn publish(&self, snapshot: &RegisterSnapshot) {
        self.inner.lock().apply_snapshot(snapshot);
    }
}
