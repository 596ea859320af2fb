use embassy_time::{Duration, Instant};
use rand::RngCore;

use crate::audio::AudioSnapshot;

/// Everything an effect may read about the current frame.
///
/// Effects never consult clocks, audio state or random sources on their own.
pub struct FrameContext<'a> {
    pub now: Instant,
    /// Time since the previous rendered frame
    pub delta: Duration,
    pub audio: AudioSnapshot,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> FrameContext<'a> {
    pub fn new(now: Instant, rng: &'a mut dyn RngCore) -> Self {
        Self {
            now,
            delta: Duration::from_millis(0),
            audio: AudioSnapshot::SILENT,
            rng,
        }
    }

    #[must_use]
    pub fn with_delta(mut self, delta: Duration) -> Self {
        self.delta = delta;
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: AudioSnapshot) -> Self {
        self.audio = audio;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_micros() as f32 / 1_000_000.0
    }
}

/// Seconds between two instants, zero if `later` is earlier
#[allow(clippy::cast_precision_loss)]
pub fn secs_between(earlier: Instant, later: Instant) -> f32 {
    later.saturating_duration_since(earlier).as_micros() as f32 / 1_000_000.0
}
