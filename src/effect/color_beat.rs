//! Beat-driven fan flashes
//!
//! A dim blue glow follows the audio level. Each detected beat lights one or
//! more fans (or strip segments on layouts without fans) in a color chosen by
//! how long it has been since the previous beat. Major beats light
//! everything in purple. Flashes fade out as particles.

use embassy_time::{Duration, Instant};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{BeatReactive, Effect, EffectBase, EffectId, compose_record};
use crate::{
    addressing::{Layout, PixelOrder},
    beat::{Beat, BeatConfig, BeatDetector},
    canvas::Canvas,
    color::{Hsv, Rgb, fade_to_black_by, hsv2rgb},
    context::FrameContext,
    error::EffectError,
    math8::unit_to_u8,
    particles::{FadePhases, Particle, ParticleSystem},
    record::{Record, from_record, require_finite},
};

const SEGMENTS_WITHOUT_FANS: usize = 4;
const MAX_FLASHES: usize = 32;
const CYAN: Rgb = Rgb { r: 0, g: 255, b: 255 };
const PURPLE: Rgb = Rgb {
    r: 128,
    g: 0,
    b: 128,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorBeatConfig {
    #[serde(rename = "bmr")]
    pub min_range: f32,
    #[serde(rename = "bme")]
    pub min_elapsed_ms: u64,
    #[serde(rename = "bmj")]
    pub major_elapsed_ms: u64,
    /// Seconds a flash takes to fade out
    #[serde(rename = "fdt")]
    pub fade_time: f32,
}

impl Default for ColorBeatConfig {
    fn default() -> Self {
        Self {
            min_range: 0.5,
            min_elapsed_ms: 250,
            major_elapsed_ms: 1000,
            fade_time: 0.5,
        }
    }
}

impl ColorBeatConfig {
    fn beat_config(&self) -> BeatConfig {
        BeatConfig::new(self.min_range, Duration::from_millis(self.min_elapsed_ms))
            .with_major_elapsed(Duration::from_millis(self.major_elapsed_ms))
    }
}

/// One lit fan, or every fan when `segment` is `None`
#[derive(Debug, Clone)]
struct Flash {
    birth: Instant,
    segment: Option<usize>,
    segments: usize,
    color: Rgb,
    phases: FadePhases,
}

impl Flash {
    #[allow(clippy::cast_precision_loss)]
    fn draw_segment(&self, canvas: &mut Canvas<'_, '_>, segment: usize, color: Rgb) {
        if let Some(fans) = canvas.layout().as_fans() {
            let size = fans.fan_size() as f32;
            canvas.draw_fan_pixels(0.0, size, color, PixelOrder::Sequential, segment);
        } else {
            let size = (canvas.led_count() / self.segments.max(1)) as f32;
            canvas.set_pixels_f(segment as f32 * size, size, color, true);
        }
    }
}

impl Particle for Flash {
    fn birth(&self) -> Instant {
        self.birth
    }

    fn phases(&self) -> FadePhases {
        self.phases
    }

    fn render(&self, now: Instant, canvas: &mut Canvas<'_, '_>) {
        let color = fade_to_black_by(self.color, unit_to_u8(self.fadeout_amount(now)));
        match self.segment {
            Some(segment) => self.draw_segment(canvas, segment, color),
            None => {
                for segment in 0..self.segments {
                    self.draw_segment(canvas, segment, color);
                }
            }
        }
    }
}

pub struct ColorBeatEffect {
    base: EffectBase,
    config: ColorBeatConfig,
    detector: BeatDetector,
    flashes: ParticleSystem<Flash>,
    segments: usize,
    last_segment: Option<usize>,
}

impl Default for ColorBeatEffect {
    fn default() -> Self {
        Self::new(ColorBeatConfig::default())
    }
}

impl ColorBeatEffect {
    pub fn new(config: ColorBeatConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::COLOR_BEAT, "Color Beat"),
            detector: BeatDetector::new(config.beat_config(), Instant::from_millis(0)),
            config,
            flashes: ParticleSystem::new(MAX_FLASHES),
            segments: SEGMENTS_WITHOUT_FANS,
            last_segment: None,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let config: ColorBeatConfig = from_record(record)?;
        require_finite(&[("bmr", config.min_range), ("fdt", config.fade_time)])?;
        let mut effect = Self::new(config);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    pub fn flash_count(&self) -> usize {
        self.flashes.len()
    }

    /// A segment other than the one lit last
    fn pick_segment(&mut self, rng: &mut dyn rand::RngCore) -> usize {
        let mut segment = rng.gen_range(0..self.segments);
        if self.segments > 1 && Some(segment) == self.last_segment {
            segment = (segment + rng.gen_range(1..self.segments)) % self.segments;
        }
        self.last_segment = Some(segment);
        segment
    }

    fn flash(&mut self, now: Instant, segment: Option<usize>, color: Rgb) {
        self.flashes.spawn(Flash {
            birth: now,
            segment,
            segments: self.segments,
            color,
            phases: FadePhases::new(0.0, 0.0, 0.0, self.config.fade_time),
        });
    }
}

/// Hue that slowly swings back and forth, `rate` swings per minute
#[allow(clippy::cast_possible_truncation)]
fn swinging_hue(now: Instant, rate: u64) -> u8 {
    let phase = (now.as_millis() * rate * 256 / 60_000) % 512;
    if phase < 256 { phase as u8 } else { (511 - phase) as u8 }
}

impl BeatReactive for ColorBeatEffect {
    fn beat_detector(&mut self) -> &mut BeatDetector {
        &mut self.detector
    }

    fn handle_beat(&mut self, beat: &Beat, ctx: &mut FrameContext<'_>) {
        if beat.major {
            self.flash(ctx.now, None, PURPLE);
            return;
        }

        let mut lit = 1;
        let color = if beat.elapsed < 0.10 {
            hsv_full(swinging_hue(ctx.now, 2))
        } else if beat.elapsed < 0.25 {
            hsv_full(swinging_hue(ctx.now, 3))
        } else if beat.elapsed > 0.5 {
            lit = ctx.rng.gen_range(1..=self.segments);
            hsv_full(swinging_hue(ctx.now, 4))
        } else {
            CYAN
        };

        for _ in 0..lit {
            let segment = self.pick_segment(ctx.rng);
            self.flash(ctx.now, Some(segment), color);
        }
    }
}

fn hsv_full(hue: u8) -> Rgb {
    hsv2rgb(Hsv {
        hue,
        sat: 255,
        val: 255,
    })
}

impl Effect for ColorBeatEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn init(&mut self, layout: &Layout) -> Result<(), EffectError> {
        self.segments = layout
            .as_fans()
            .map_or(SEGMENTS_WITHOUT_FANS, |fans| fans.fan_count().max(1));
        Ok(())
    }

    fn start(&mut self, ctx: &mut FrameContext<'_>) {
        self.detector.reset(ctx.now);
        self.flashes.clear();
        self.last_segment = None;
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        let dt = ctx.delta_secs();
        let glow = (255.0 * ctx.audio.vu_ratio * dt * 0.75).clamp(0.0, 255.0) as u8;
        canvas.set_pixels_f(
            0.0,
            canvas.led_count() as f32,
            Rgb { r: 0, g: 0, b: glow },
            true,
        );
        canvas.fade_all_by((1000.0 * dt).clamp(0.0, 255.0) as u8);
        self.flashes.render(ctx.now, canvas);
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        compose_record(&self.base, &self.config)
    }

    fn as_beat_reactive(&mut self) -> Option<&mut dyn BeatReactive> {
        Some(self)
    }
}
