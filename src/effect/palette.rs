//! Scrolling palette lights
//!
//! Draws lights of `light_size` pixels separated by `gap_size` pixels, each
//! colored from the palette. The lights scroll at `leds_per_second` while the
//! palette itself rotates at `speed`.

use libm::fmodf;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectBase, EffectId, compose_record};
use crate::{
    canvas::Canvas,
    color::{BlendMode, Palette, Rgb},
    context::FrameContext,
    error::EffectError,
    math8::unit_to_u8,
    record::{Record, from_record, require_finite},
};

/// Palette steps per second at speed 1.0, roughly one palette per meter of
/// 144 pixel strip
const PALETTE_STEPS_PER_SECOND: f32 = 32.0 * 256.0 / 144.0;

/// Narrowest light drawn; keeps the number of lights per frame bounded
const MIN_LIGHT_SIZE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    #[serde(rename = "pl")]
    pub palette: Palette,
    /// Palette index advance per pixel
    #[serde(rename = "dns")]
    pub density: f32,
    #[serde(rename = "sp")]
    pub speed: f32,
    #[serde(rename = "lps")]
    pub leds_per_second: f32,
    #[serde(rename = "lsz")]
    pub light_size: f32,
    #[serde(rename = "gsz")]
    pub gap_size: f32,
    #[serde(rename = "bl")]
    pub blend: BlendMode,
    #[serde(rename = "er")]
    pub erase: bool,
    #[serde(rename = "bns")]
    pub brightness: f32,
}

impl PaletteConfig {
    fn validate(&self) -> Result<(), EffectError> {
        require_finite(&[
            ("dns", self.density),
            ("sp", self.speed),
            ("lps", self.leds_per_second),
            ("lsz", self.light_size),
            ("gsz", self.gap_size),
            ("bns", self.brightness),
        ])
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            palette: Palette::rainbow(),
            density: 1.0,
            speed: 1.0,
            leds_per_second: 0.0,
            light_size: 1.0,
            gap_size: 1.0,
            blend: BlendMode::Linear,
            erase: true,
            brightness: 1.0,
        }
    }
}

/// Wrap a palette position into `[0, 256)`
fn wrap_index(index: f32) -> f32 {
    let wrapped = fmodf(index, 256.0);
    if wrapped < 0.0 { wrapped + 256.0 } else { wrapped }
}

#[derive(Debug, Clone)]
pub struct PaletteEffect {
    base: EffectBase,
    config: PaletteConfig,
    start_index: f32,
    palette_index: f32,
}

impl Default for PaletteEffect {
    fn default() -> Self {
        Self::new(PaletteConfig::default())
    }
}

impl PaletteEffect {
    pub fn new(config: PaletteConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::PALETTE, "Palette Effect"),
            config,
            start_index: 0.0,
            palette_index: 0.0,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let config: PaletteConfig = from_record(record)?;
        config.validate()?;
        let mut effect = Self::new(config);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn color_at(&self, index: f32) -> Rgb {
        let position = (wrap_index(index) * 256.0) as u16;
        self.config.palette.sample_fixed(
            position,
            unit_to_u8(self.config.brightness),
            self.config.blend,
        )
    }
}

impl Effect for PaletteEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn start(&mut self, _ctx: &mut FrameContext<'_>) {
        self.start_index = 0.0;
        self.palette_index = 0.0;
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        if self.config.erase {
            canvas.clear();
        }
        let len = canvas.led_count() as f32;
        let light = self.config.light_size;
        if light.is_nan() || light <= 0.0 {
            return;
        }
        // Lights and gaps wider than the strip look the same as the strip
        let light = light.clamp(MIN_LIGHT_SIZE, len.max(MIN_LIGHT_SIZE));
        let gap = if self.config.gap_size.is_nan() {
            0.0
        } else {
            self.config.gap_size.clamp(0.0, len)
        };

        let dt = ctx.delta_secs();
        let density = self.config.density;
        let total = (gap + light + 1.0) as i32;
        self.start_index = if total > 1 {
            fmodf(self.start_index + dt * self.config.leds_per_second, total as f32)
        } else {
            0.0
        };
        self.palette_index = wrap_index(
            self.palette_index - dt * self.config.speed * density * PALETTE_STEPS_PER_SECOND,
        );

        let base_index = self.palette_index + self.start_index * density;

        if gap == 0.0 {
            let count = (len / light) as usize + 1;
            let mut color_index = base_index;
            for n in 0..count {
                let pos = n as f32 * light;
                if pos >= len {
                    break;
                }
                color_index += density;
                canvas.set_pixels_f(pos, light, self.color_at(color_index), false);
            }
        } else {
            // Start one light and gap before the strip so lights scroll in
            // instead of popping into existence. The palette advances one
            // step per pixel, lit or not.
            let end = len + light;
            let mut pos = -total;
            while (pos as f32) < end {
                let steps = (pos + total + 1) as f32;
                let color = self.color_at(base_index + steps * density);
                canvas.set_pixels_f(pos as f32 + self.start_index, light, color, false);
                pos += total;
            }
        }
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        compose_record(&self.base, &self.config)
    }
}
