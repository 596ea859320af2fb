//! Scrolling rainbow
//!
//! Walks the hue circle along the strip, advancing the starting hue by one
//! step every `step_ms`. In mirrored mode the first half is painted and
//! reflected onto the second.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectBase, EffectId, compose_record};
use crate::{
    addressing::center_len,
    canvas::Canvas,
    color::{Hsv, Rgb, hsv2rgb},
    context::FrameContext,
    error::EffectError,
    record::{Record, from_record},
    timer::RateLimiter,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainbowFillConfig {
    /// Hue difference between neighbouring pixels
    #[serde(rename = "dlt")]
    pub delta_hue: u8,
    /// Milliseconds between hue steps
    #[serde(rename = "hsi")]
    pub step_ms: u64,
    #[serde(rename = "mr")]
    pub mirrored: bool,
    #[serde(rename = "sat")]
    pub saturation: u8,
}

impl Default for RainbowFillConfig {
    fn default() -> Self {
        Self {
            delta_hue: 4,
            step_ms: 20,
            mirrored: false,
            saturation: 255,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RainbowFillEffect {
    base: EffectBase,
    config: RainbowFillConfig,
    hue: u8,
    step: RateLimiter,
}

impl Default for RainbowFillEffect {
    fn default() -> Self {
        Self::new(RainbowFillConfig::default())
    }
}

impl RainbowFillEffect {
    pub fn new(config: RainbowFillConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::RAINBOW_FILL, "Rainbow Fill"),
            step: RateLimiter::from_millis(config.step_ms),
            config,
            hue: 0,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let mut effect = Self::new(from_record(record)?);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    #[must_use]
    pub fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.config.mirrored = mirrored;
        self
    }

    pub fn hue(&self) -> u8 {
        self.hue
    }

    fn color_at(&self, i: usize) -> Rgb {
        #[allow(clippy::cast_possible_truncation)]
        let offset = (i as u8).wrapping_mul(self.config.delta_hue);
        hsv2rgb(Hsv {
            hue: self.hue.wrapping_add(offset),
            sat: self.config.saturation,
            val: 255,
        })
    }
}

impl Effect for RainbowFillEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn start(&mut self, _ctx: &mut FrameContext<'_>) {
        self.hue = 0;
        self.step.set_interval(Duration::from_millis(self.config.step_ms));
        self.step.reset();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        if self.step.ready(ctx.now) {
            self.hue = self.hue.wrapping_add(1);
        }

        let len = canvas.led_count();
        if self.config.mirrored {
            for i in 0..center_len(len) {
                let color = self.color_at(i);
                canvas.set_pixel(i as i32, color);
                canvas.set_pixel((len - 1 - i) as i32, color);
            }
        } else {
            for i in 0..len {
                canvas.set_pixel(i as i32, self.color_at(i));
            }
        }
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        compose_record(&self.base, &self.config)
    }
}
