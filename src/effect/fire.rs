//! Classic one-dimensional fire
//!
//! Heat cools everywhere, drifts away from the base, and random sparks
//! ignite near the base. Heat is mapped through a palette. The heat buffer
//! is sized to the layout in `init`.

use alloc::vec::Vec;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectBase, EffectId, compose_record};
use crate::{
    addressing::Layout,
    canvas::Canvas,
    color::{BlendMode, Palette},
    context::FrameContext,
    error::EffectError,
    math8::{qadd8, qsub8, scale8},
    record::{Record, from_record},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicFireConfig {
    /// How fast the flame cools; higher is shorter
    #[serde(rename = "coo")]
    pub cooling: u8,
    /// Chance per frame (out of 255) of a new spark
    #[serde(rename = "spk")]
    pub sparking: u8,
    /// Pixels at the base where sparks may ignite
    #[serde(rename = "spz")]
    pub spark_zone: u16,
    /// Burn from both ends toward the middle
    #[serde(rename = "mr")]
    pub mirrored: bool,
    #[serde(rename = "pl")]
    pub palette: Palette,
    #[serde(rename = "bl")]
    pub blend: BlendMode,
}

impl Default for ClassicFireConfig {
    fn default() -> Self {
        Self {
            cooling: 55,
            sparking: 120,
            spark_zone: 3,
            mirrored: false,
            palette: Palette::heat(),
            blend: BlendMode::Linear,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassicFireEffect {
    base: EffectBase,
    config: ClassicFireConfig,
    heat: Vec<u8>,
}

impl Default for ClassicFireEffect {
    fn default() -> Self {
        Self::new(ClassicFireConfig::default())
    }
}

impl ClassicFireEffect {
    pub fn new(config: ClassicFireConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::CLASSIC_FIRE, "Classic Fire"),
            config,
            heat: Vec::new(),
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let mut effect = Self::new(from_record(record)?);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    pub fn heat(&self) -> &[u8] {
        &self.heat
    }

    /// Cells simulated for a display of `led_count` pixels
    fn cells_for(&self, led_count: usize) -> usize {
        if self.config.mirrored {
            led_count / 2 + led_count % 2
        } else {
            led_count
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn step(&mut self, rng: &mut dyn rand::RngCore) {
        let len = self.heat.len();
        if len == 0 {
            return;
        }

        let max_cooling = (usize::from(self.config.cooling) * 10 / len + 2).min(255) as u8;
        for cell in &mut self.heat {
            *cell = qsub8(*cell, rng.gen_range(0..=max_cooling));
        }

        for k in (2..len).rev() {
            let sum = u16::from(self.heat[k - 1]) + 2 * u16::from(self.heat[k - 2]);
            self.heat[k] = (sum / 3) as u8;
        }

        if rng.gen_range(0..=255u8) < self.config.sparking {
            let zone = usize::from(self.config.spark_zone).clamp(1, len);
            let y = rng.gen_range(0..zone);
            self.heat[y] = qadd8(self.heat[y], rng.gen_range(160..=255));
        }
    }
}

impl Effect for ClassicFireEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn init(&mut self, layout: &Layout) -> Result<(), EffectError> {
        let cells = self.cells_for(layout.led_count());
        let mut heat = Vec::new();
        heat.try_reserve_exact(cells)
            .map_err(|_| EffectError::Allocation { requested: cells })?;
        heat.resize(cells, 0);
        self.heat = heat;
        Ok(())
    }

    fn start(&mut self, _ctx: &mut FrameContext<'_>) {
        self.heat.fill(0);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        self.step(ctx.rng);

        let len = canvas.led_count();
        canvas.clear();
        for (i, &heat) in self.heat.iter().enumerate() {
            let color = self
                .config
                .palette
                .sample_with(scale8(heat, 240), 255, self.config.blend);
            canvas.set_pixel(i as i32, color);
            if self.config.mirrored {
                canvas.set_pixel((len - 1 - i) as i32, color);
            }
        }
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        compose_record(&self.base, &self.config)
    }

    fn desired_fps(&self) -> u32 {
        45
    }
}
