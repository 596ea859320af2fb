//! Frame pacing.
//!
//! Provides portable frame pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping between frames.

use alloc::vec::Vec;

use embassy_time::{Duration, Instant};
use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    OutputDriver,
    audio::AudioLevel,
    color::{BLACK, Rgb},
    context::FrameContext,
    error::EffectError,
    manager::EffectManager,
};

/// Default upper bound on the frame rate.
pub const DEFAULT_MAX_FPS: u32 = 90;

/// Maximum number of output channels mirrored by one scheduler.
pub const MAX_CHANNELS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Effects asking for more frames than this are capped
    pub max_fps: u32,
    /// Number of output channels, each receiving the same frame
    pub channel_count: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_fps: DEFAULT_MAX_FPS,
            channel_count: 1,
        }
    }
}

/// Result of a frame tick operation.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (may be zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Drives the effect manager at the current effect's desired frame rate.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(manager, driver, &AUDIO, SchedulerConfig::default(), seed)?;
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     Timer::after(result.sleep_duration).await;
/// }
/// ```
pub struct FrameScheduler<'a, O: OutputDriver> {
    output: O,
    manager: EffectManager,
    buffers: Vec<Vec<Rgb>>,
    audio: &'a AudioLevel,
    rng: SmallRng,
    config: SchedulerConfig,
    next_frame: Instant,
    last_frame: Option<Instant>,
}

impl<'a, O: OutputDriver> FrameScheduler<'a, O> {
    /// Create a scheduler with one frame buffer per channel.
    pub fn new(
        manager: EffectManager,
        output: O,
        audio: &'a AudioLevel,
        config: SchedulerConfig,
        seed: u64,
    ) -> Result<Self, EffectError> {
        let channel_count = config.channel_count.clamp(1, MAX_CHANNELS);
        let led_count = manager.layout().led_count();

        let mut buffers = Vec::new();
        buffers
            .try_reserve_exact(channel_count)
            .map_err(|_| EffectError::Allocation {
                requested: channel_count,
            })?;
        for _ in 0..channel_count {
            let mut buffer = Vec::new();
            buffer
                .try_reserve_exact(led_count)
                .map_err(|_| EffectError::Allocation {
                    requested: led_count,
                })?;
            buffer.resize(led_count, BLACK);
            buffers.push(buffer);
        }

        Ok(Self {
            output,
            manager,
            buffers,
            audio,
            rng: SmallRng::seed_from_u64(seed),
            config: SchedulerConfig {
                channel_count,
                ..config
            },
            next_frame: Instant::from_millis(0),
            last_frame: None,
        })
    }

    pub fn manager(&self) -> &EffectManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EffectManager {
        &mut self.manager
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Frame duration for the current effect, capped by `max_fps`.
    pub fn frame_duration(&self) -> Duration {
        let fps = self
            .manager
            .desired_fps()
            .min(self.config.max_fps)
            .max(1);
        Duration::from_millis(1000 / u64::from(fps))
    }

    /// Render one frame, write it to every channel and return timing information.
    ///
    /// The caller is responsible for waiting until `next_deadline` before
    /// calling `tick` again.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        let frame_duration = self.frame_duration();

        // Skip the backlog instead of catching up after long stalls
        let max_drift = frame_duration.as_millis() * 2;
        if now.as_millis() > self.next_frame.as_millis() + max_drift {
            if self.last_frame.is_some() {
                log::debug!(
                    "frame late by {}ms, resetting schedule",
                    now.as_millis() - self.next_frame.as_millis()
                );
            }
            self.next_frame = now;
        }

        let delta = self
            .last_frame
            .map_or(Duration::from_millis(0), |last| {
                now.saturating_duration_since(last)
            });
        self.last_frame = Some(now);

        let mut ctx = FrameContext::new(now, &mut self.rng)
            .with_delta(delta)
            .with_audio(self.audio.latest());

        {
            let mut views: heapless::Vec<&mut [Rgb], MAX_CHANNELS> = self
                .buffers
                .iter_mut()
                .take(MAX_CHANNELS)
                .map(Vec::as_mut_slice)
                .collect();
            self.manager.render(&mut ctx, &mut views);
        }

        for (channel, buffer) in self.buffers.iter().enumerate() {
            self.output.write(channel, buffer);
        }

        self.next_frame += frame_duration;

        let sleep_duration = if self.next_frame.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_frame.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
        }
    }
}
