//! Latest-value mailbox between the audio sampling task and the renderer.
//!
//! The sampler overwrites the published snapshot whenever it has a new one;
//! the renderer reads whatever is current without waiting. Access is guarded
//! by a critical section so the two sides may live in different interrupt
//! priorities or threads.

use core::cell::Cell;

use critical_section::Mutex;

/// One reading of the external audio analyzer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSnapshot {
    /// Current level relative to the recent average (1.0 = average)
    pub vu_ratio: f32,
    /// Raw level
    pub vu: f32,
}

impl AudioSnapshot {
    pub const SILENT: Self = Self {
        vu_ratio: 1.0,
        vu: 0.0,
    };

    pub const fn new(vu_ratio: f32, vu: f32) -> Self {
        Self { vu_ratio, vu }
    }
}

impl Default for AudioSnapshot {
    fn default() -> Self {
        Self::SILENT
    }
}

pub struct AudioLevel {
    inner: Mutex<Cell<AudioSnapshot>>,
}

impl AudioLevel {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(AudioSnapshot::SILENT)),
        }
    }

    /// Replace the current snapshot
    pub fn publish(&self, snapshot: AudioSnapshot) {
        critical_section::with(|cs| self.inner.borrow(cs).set(snapshot));
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> AudioSnapshot {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }
}

impl Default for AudioLevel {
    fn default() -> Self {
        Self::new()
    }
}
