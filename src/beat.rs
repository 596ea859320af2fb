//! Sliding-window beat detection over the audio level ratio.
//!
//! Every processed sample goes into a window of the last
//! [`BEAT_WINDOW_SAMPLES`] readings. Once the spread between the loudest and
//! quietest sample exceeds `min_range`, the swing is either reported as a
//! beat or, if it arrives sooner than `min_elapsed` after the previous beat,
//! discarded as noise. Both outcomes clear the window. Discarding does not
//! move the last-beat time, so a real beat shortly afterwards still fires.
//!
//! There is no further false-positive rejection.

use embassy_time::{Duration, Instant};
use heapless::Deque;

use crate::context::secs_between;

pub const BEAT_WINDOW_SAMPLES: usize = 60;

/// Sensitivity of one detector instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatConfig {
    /// Spread of the window that counts as a swing
    pub min_range: f32,
    /// Swings sooner than this after the last beat are noise
    pub min_elapsed: Duration,
    /// Beats at least this long after the previous one are major
    pub major_elapsed: Duration,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            min_range: 0.75,
            min_elapsed: Duration::from_millis(200),
            major_elapsed: Duration::from_millis(1000),
        }
    }
}

impl BeatConfig {
    pub fn new(min_range: f32, min_elapsed: Duration) -> Self {
        Self {
            min_range,
            min_elapsed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_major_elapsed(mut self, major_elapsed: Duration) -> Self {
        self.major_elapsed = major_elapsed;
        self
    }
}

/// Detector state relative to the suppression window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatPhase {
    /// Too soon after the last beat; swings are treated as noise
    Idle,
    /// The next swing will be reported
    Armed,
}

/// A detected beat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    pub major: bool,
    /// Seconds since the previous beat
    pub elapsed: f32,
    /// Spread of the window that triggered the beat
    pub span: f32,
}

#[derive(Debug, Clone)]
pub struct BeatDetector {
    config: BeatConfig,
    window: Deque<f32, BEAT_WINDOW_SAMPLES>,
    last_beat: Instant,
}

impl BeatDetector {
    /// The first beat is measured from `now`
    pub fn new(config: BeatConfig, now: Instant) -> Self {
        Self {
            config,
            window: Deque::new(),
            last_beat: now,
        }
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BeatConfig) {
        self.config = config;
    }

    pub fn last_beat(&self) -> Instant {
        self.last_beat
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    pub fn phase(&self, now: Instant) -> BeatPhase {
        if now.saturating_duration_since(self.last_beat) < self.config.min_elapsed {
            BeatPhase::Idle
        } else {
            BeatPhase::Armed
        }
    }

    pub fn seconds_since_last_beat(&self, now: Instant) -> f32 {
        secs_between(self.last_beat, now)
    }

    /// Forget all samples and measure the next beat from `now`
    pub fn reset(&mut self, now: Instant) {
        self.window.clear();
        self.last_beat = now;
    }

    /// Feed one level-ratio sample
    pub fn process(&mut self, now: Instant, vu_ratio: f32) -> Option<Beat> {
        if self.window.is_full() {
            self.window.pop_front();
        }
        // Cannot fail: a slot was freed above
        let _ = self.window.push_back(vu_ratio);

        let (min, max) = self
            .window
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = max - min;
        if span <= self.config.min_range {
            return None;
        }

        self.window.clear();
        if self.phase(now) == BeatPhase::Idle {
            log::trace!("swing of {span} ignored inside the suppression window");
            return None;
        }

        let since = now.saturating_duration_since(self.last_beat);
        let beat = Beat {
            major: since >= self.config.major_elapsed,
            elapsed: secs_between(self.last_beat, now),
            span,
        };
        self.last_beat = now;
        log::debug!(
            "beat: major={} elapsed={} span={}",
            beat.major,
            beat.elapsed,
            beat.span
        );
        Some(beat)
    }
}
