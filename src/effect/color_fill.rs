//! Solid color fill
//!
//! Fills every pixel with one color. Activation and color changes crossfade
//! over a configurable duration.

use embassy_time::{Duration, Instant};
use serde::{Deserialize, Serialize};

use super::{Effect, EffectBase, EffectId, compose_record};
use crate::{
    canvas::Canvas,
    color::{BLACK, Rgb, blend_colors, serde_rgb},
    context::FrameContext,
    error::EffectError,
    math8::{ease_in_out_quad, progress8},
    record::{Record, from_record},
};

const WARM_WHITE: Rgb = Rgb {
    r: 255,
    g: 160,
    b: 64,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorFillConfig {
    #[serde(rename = "cl", with = "serde_rgb")]
    pub color: Rgb,
    /// Crossfade length in milliseconds
    #[serde(rename = "fdt")]
    pub fade_ms: u64,
}

impl Default for ColorFillConfig {
    fn default() -> Self {
        Self {
            color: WARM_WHITE,
            fade_ms: 500,
        }
    }
}

/// Eased crossfade between two colors
#[derive(Debug, Clone)]
struct ColorTransition {
    current: Rgb,
    source: Rgb,
    target: Option<Rgb>,
    duration: Duration,
    start_time: Instant,
}

impl ColorTransition {
    const fn new(initial: Rgb) -> Self {
        Self {
            current: initial,
            source: initial,
            target: None,
            duration: Duration::from_millis(0),
            start_time: Instant::from_millis(0),
        }
    }

    fn set(&mut self, value: Rgb, duration: Duration, now: Instant) {
        self.start_time = now;
        if duration.as_millis() == 0 {
            self.current = value;
            self.source = value;
            self.target = None;
        } else {
            self.source = self.current;
            self.target = Some(value);
            self.duration = duration;
        }
    }

    fn jump(&mut self, value: Rgb) {
        self.current = value;
        self.source = value;
        self.target = None;
    }

    fn tick(&mut self, now: Instant) -> Rgb {
        let Some(target) = self.target else {
            return self.current;
        };

        let elapsed = now.saturating_duration_since(self.start_time);
        if elapsed >= self.duration {
            self.jump(target);
            return self.current;
        }

        let progress = ease_in_out_quad(progress8(elapsed, self.duration));
        self.current = blend_colors(self.source, target, progress);
        self.current
    }
}

#[derive(Debug, Clone)]
pub struct ColorFillEffect {
    base: EffectBase,
    config: ColorFillConfig,
    transition: ColorTransition,
}

impl Default for ColorFillEffect {
    fn default() -> Self {
        Self::new(ColorFillConfig::default())
    }
}

impl ColorFillEffect {
    pub fn new(config: ColorFillConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::COLOR_FILL, "Color Fill"),
            transition: ColorTransition::new(config.color),
            config,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let mut effect = Self::new(from_record(record)?);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    pub fn config(&self) -> &ColorFillConfig {
        &self.config
    }

    pub fn current_color(&self) -> Rgb {
        self.transition.current
    }

    /// Crossfade to `color` starting at `now`
    pub fn set_color(&mut self, color: Rgb, duration: Duration, now: Instant) {
        self.config.color = color;
        self.transition.set(color, duration, now);
    }
}

impl Effect for ColorFillEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn start(&mut self, ctx: &mut FrameContext<'_>) {
        self.transition.jump(BLACK);
        self.transition.set(
            self.config.color,
            Duration::from_millis(self.config.fade_ms),
            ctx.now,
        );
    }

    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        let color = self.transition.tick(ctx.now);
        canvas.fill(color);
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        compose_record(&self.base, &self.config)
    }
}
