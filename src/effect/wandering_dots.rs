//! Antialiased dots bouncing around a matrix
//!
//! Each dot is drawn with a sub-pixel splat so motion slower than one pixel
//! per frame still looks smooth. The previous frame fades to leave trails.

use alloc::vec::Vec;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectBase, EffectId, MAX_PIXELS_PER_SECOND, compose_record};
use crate::{
    addressing::Layout,
    canvas::Canvas,
    color::{BlendMode, Palette},
    context::FrameContext,
    error::EffectError,
    record::{Record, from_record, require_finite},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderingDotsConfig {
    #[serde(rename = "cnt")]
    pub count: u16,
    /// Pixels per second
    #[serde(rename = "ms")]
    pub max_speed: f32,
    /// Trail fade per frame
    #[serde(rename = "fdb")]
    pub fade: u8,
    #[serde(rename = "pl")]
    pub palette: Palette,
    #[serde(rename = "bl")]
    pub blend: BlendMode,
}

impl Default for WanderingDotsConfig {
    fn default() -> Self {
        Self {
            count: 6,
            max_speed: 8.0,
            fade: 64,
            palette: Palette::rainbow(),
            blend: BlendMode::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color_index: u8,
}

/// Reflect a coordinate off `[0, max]`, flipping the velocity
fn bounce(pos: &mut f32, vel: &mut f32, max: f32) {
    if *pos < 0.0 {
        *pos = -*pos;
        *vel = vel.abs();
    } else if *pos > max {
        *pos = (2.0 * max - *pos).max(0.0);
        *vel = -vel.abs();
    }
}

#[derive(Debug, Clone)]
pub struct WanderingDotsEffect {
    base: EffectBase,
    config: WanderingDotsConfig,
    dots: Vec<Dot>,
    width: f32,
    height: f32,
}

impl Default for WanderingDotsEffect {
    fn default() -> Self {
        Self::new(WanderingDotsConfig::default())
    }
}

impl WanderingDotsEffect {
    pub fn new(config: WanderingDotsConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::WANDERING_DOTS, "Wandering Dots"),
            config,
            dots: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let config: WanderingDotsConfig = from_record(record)?;
        require_finite(&[("ms", config.max_speed)])?;
        let mut effect = Self::new(config);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    fn random_speed(&self, rng: &mut dyn rand::RngCore) -> f32 {
        let max = self.config.max_speed.abs().min(MAX_PIXELS_PER_SECOND);
        if max > 0.0 {
            rng.gen_range(-max..max)
        } else {
            0.0
        }
    }
}

impl Effect for WanderingDotsEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    #[allow(clippy::cast_precision_loss)]
    fn init(&mut self, layout: &Layout) -> Result<(), EffectError> {
        let count = usize::from(self.config.count);
        let mut dots = Vec::new();
        dots.try_reserve_exact(count)
            .map_err(|_| EffectError::Allocation {
                requested: count * core::mem::size_of::<Dot>(),
            })?;
        self.dots = dots;
        self.width = layout.width().saturating_sub(1) as f32;
        self.height = layout.height().saturating_sub(1) as f32;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn start(&mut self, ctx: &mut FrameContext<'_>) {
        self.dots.clear();
        for i in 0..usize::from(self.config.count) {
            let dot = Dot {
                x: ctx.rng.gen_range(0.0..=self.width),
                y: ctx.rng.gen_range(0.0..=self.height),
                vx: self.random_speed(ctx.rng),
                vy: if self.height > 0.0 {
                    self.random_speed(ctx.rng)
                } else {
                    0.0
                },
                color_index: (i * 256 / usize::from(self.config.count).max(1)) as u8,
            };
            self.dots.push(dot);
        }
    }

    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        let dt = ctx.delta_secs();
        canvas.fade_all_by(self.config.fade);

        for dot in &mut self.dots {
            dot.x += dot.vx * dt;
            dot.y += dot.vy * dt;
            bounce(&mut dot.x, &mut dot.vx, self.width);
            bounce(&mut dot.y, &mut dot.vy, self.height);

            let color = self
                .config
                .palette
                .sample_with(dot.color_index, 255, self.config.blend);
            canvas.splat_subpixel(dot.x, dot.y, color);
        }
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        compose_record(&self.base, &self.config)
    }

    fn desired_fps(&self) -> u32 {
        60
    }
}
