//! Twinkling stars drawn from a particle system
//!
//! [`StarryNightEffect`] is generic over a [`StarKind`] that fixes the star
//! lifetime, color and size curve. All kinds share one effect id; the record
//! carries the kind's sub-type number under `st`.

use alloc::boxed::Box;
use core::marker::PhantomData;

use embassy_time::Instant;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{
    Effect, EffectBase, EffectId, MAX_PIXELS_PER_SECOND, SubtypeRegistry, compose_record,
};
use crate::{
    addressing::Layout,
    canvas::Canvas,
    color::{BLACK, BlendMode, Palette, Rgb, WHITE, fade_to_black_by, serde_rgb},
    context::FrameContext,
    error::EffectError,
    math8::unit_to_u8,
    particles::{FadePhases, Particle, ParticleSystem},
    record::{Record, from_record, keys, require_finite},
};

const MAX_NEW_STARS_PER_FRAME: usize = 144;
const MAX_STARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarryNightConfig {
    #[serde(rename = "pl")]
    pub palette: Palette,
    /// New stars per second per hundred pixels, before music
    #[serde(rename = "spb")]
    pub probability: f32,
    #[serde(rename = "sz")]
    pub star_size: f32,
    #[serde(rename = "bl")]
    pub blend: BlendMode,
    /// Pixels per second
    #[serde(rename = "ms")]
    pub max_speed: f32,
    /// 0 clears each frame, otherwise blur and fade the previous frame
    #[serde(rename = "bu")]
    pub blur: f32,
    /// How strongly loudness drives spawning and speed
    #[serde(rename = "msf")]
    pub music_factor: f32,
    #[serde(rename = "cl", with = "serde_rgb")]
    pub sky_color: Rgb,
}

impl Default for StarryNightConfig {
    fn default() -> Self {
        Self {
            palette: Palette::rainbow(),
            probability: 1.0,
            star_size: 1.0,
            blend: BlendMode::Linear,
            max_speed: 100.0,
            blur: 0.0,
            music_factor: 1.0,
            sky_color: BLACK,
        }
    }
}

/// State common to every star kind
#[derive(Debug, Clone)]
pub struct StarCore {
    pub birth: Instant,
    pub position: f32,
    pub velocity: f32,
    pub size: f32,
    pub color_index: u8,
    palette: Palette,
    blend: BlendMode,
}

impl StarCore {
    /// Palette color dimmed by age, flashing white while igniting
    pub fn faded_palette_color(&self, phases: &FadePhases, age: f32) -> Rgb {
        let color = if phases.is_igniting(age) {
            WHITE
        } else {
            self.palette.sample_with(self.color_index, 255, self.blend)
        };
        fade_to_black_by(color, unit_to_u8(phases.fadeout_amount(age)))
    }
}

/// Behaviour of one family of stars
pub trait StarKind: 'static {
    /// Persisted sub-type number
    const SUBTYPE: u32;
    const NAME: &'static str;
    const PHASES: FadePhases;

    fn color_index(rng: &mut dyn RngCore) -> u8 {
        rng.gen_range(0..=255)
    }

    fn color(star: &StarCore, age: f32) -> Rgb {
        star.faded_palette_color(&Self::PHASES, age)
    }

    fn size(star: &StarCore, _age: f32) -> f32 {
        star.size
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BasicStar;

impl StarKind for BasicStar {
    const SUBTYPE: u32 = 1;
    const NAME: &'static str = "Starry Night";
    const PHASES: FadePhases = FadePhases::new(0.0, 0.5, 1.0, 1.5);
}

/// Palette entries only, fading in slowly
#[derive(Debug, Clone, Copy)]
pub struct QuietStar;

impl StarKind for QuietStar {
    const SUBTYPE: u32 = 2;
    const NAME: &'static str = "Quiet Stars";
    const PHASES: FadePhases = FadePhases::new(1.0, 0.0, 0.0, 2.0);

    fn color_index(rng: &mut dyn RngCore) -> u8 {
        rng.gen_range(0..16u8) * 16
    }

    fn size(_star: &StarCore, _age: f32) -> f32 {
        1.0
    }
}

/// Long white sparkle after a short fade-in
#[derive(Debug, Clone, Copy)]
pub struct SparkleStar;

impl StarKind for SparkleStar {
    const SUBTYPE: u32 = 3;
    const NAME: &'static str = "Sparkle Stars";
    const PHASES: FadePhases = FadePhases::new(0.25, 5.0, 0.0, 0.0);
}

/// Grows and shrinks over its life
#[derive(Debug, Clone, Copy)]
pub struct BubblyStar;

impl StarKind for BubblyStar {
    const SUBTYPE: u32 = 4;
    const NAME: &'static str = "Bubbly Stars";
    const PHASES: FadePhases = FadePhases::new(0.0, 0.05, 0.25, 0.5);

    fn color_index(rng: &mut dyn RngCore) -> u8 {
        rng.gen_range(0..16u8) * 16
    }

    fn size(star: &StarCore, age: f32) -> f32 {
        let x = age / Self::PHASES.total() - 0.5;
        (1.0 - 4.0 * x * x) * star.size
    }
}

/// White flash cooling through the palette
#[derive(Debug, Clone, Copy)]
pub struct HotWhiteStar;

impl StarKind for HotWhiteStar {
    const SUBTYPE: u32 = 5;
    const NAME: &'static str = "Hot White Stars";
    const PHASES: FadePhases = FadePhases::new(0.0, 0.2, 0.0, 2.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn color(star: &StarCore, age: f32) -> Rgb {
        let phases = Self::PHASES;
        if age < phases.ignition + phases.hold {
            return WHITE;
        }
        let life = 1.0 - phases.fadeout_amount(age);
        star.palette
            .sample_with((130.0 * life) as u8, unit_to_u8(life), star.blend)
    }
}

/// One star of kind `K`
#[derive(Debug, Clone)]
pub struct Star<K> {
    core: StarCore,
    kind: PhantomData<K>,
}

impl<K: StarKind> Star<K> {
    pub fn core(&self) -> &StarCore {
        &self.core
    }
}

impl<K: StarKind> Particle for Star<K> {
    fn birth(&self) -> Instant {
        self.core.birth
    }

    fn phases(&self) -> FadePhases {
        K::PHASES
    }

    fn update(&mut self, dt: f32) {
        self.core.position += self.core.velocity * dt;
    }

    fn render(&self, now: Instant, canvas: &mut Canvas<'_, '_>) {
        let age = self.age(now);
        let size = K::size(&self.core, age);
        if size <= 0.0 {
            return;
        }
        let color = K::color(&self.core, age);
        canvas.set_pixels_f(self.core.position - size / 2.0, size, color, true);
    }
}

pub struct StarryNightEffect<K> {
    base: EffectBase,
    config: StarryNightConfig,
    stars: ParticleSystem<Star<K>>,
    led_count: usize,
}

impl<K: StarKind> Default for StarryNightEffect<K> {
    fn default() -> Self {
        Self::new(StarryNightConfig::default())
    }
}

impl<K: StarKind> StarryNightEffect<K> {
    pub fn new(config: StarryNightConfig) -> Self {
        Self {
            base: EffectBase::new(EffectId::STARRY_NIGHT, K::NAME),
            config,
            stars: ParticleSystem::new(MAX_STARS),
            led_count: 0,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        let config: StarryNightConfig = from_record(record)?;
        require_finite(&[
            ("spb", config.probability),
            ("sz", config.star_size),
            ("ms", config.max_speed),
            ("bu", config.blur),
            ("msf", config.music_factor),
        ])?;
        let mut effect = Self::new(config);
        effect.base = EffectBase::from_record(record)?;
        Ok(effect)
    }

    pub fn config(&self) -> &StarryNightConfig {
        &self.config
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    #[allow(clippy::cast_precision_loss)]
    fn spawn_stars(&mut self, ctx: &mut FrameContext<'_>) {
        if self.led_count < 2 {
            return;
        }
        let probability = self.config.probability / 100.0
            + (ctx.audio.vu_ratio - 1.0) * self.config.music_factor;
        let chance = ctx.delta_secs() * probability;
        if chance <= 0.0 {
            return;
        }

        for _ in 0..MAX_NEW_STARS_PER_FRAME {
            if ctx.rng.gen_range(0.0..1.0f32) >= chance {
                continue;
            }
            let max_speed = (self.config.max_speed * self.config.music_factor)
                .abs()
                .min(MAX_PIXELS_PER_SECOND);
            let velocity = if max_speed > 0.0 {
                ctx.rng.gen_range(-max_speed..max_speed)
            } else {
                0.0
            };
            let core = StarCore {
                birth: ctx.now,
                position: ctx.rng.gen_range(0..self.led_count - 1) as f32,
                velocity,
                size: self.config.star_size,
                color_index: K::color_index(ctx.rng),
                palette: self.config.palette.clone(),
                blend: self.config.blend,
            };
            self.stars.spawn(Star {
                core,
                kind: PhantomData,
            });
        }
    }
}

impl<K: StarKind> Effect for StarryNightEffect<K> {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn init(&mut self, layout: &Layout) -> Result<(), EffectError> {
        self.led_count = layout.led_count();
        self.stars
            .set_max_particles(MAX_STARS.min(self.led_count.max(1)));
        Ok(())
    }

    fn start(&mut self, _ctx: &mut FrameContext<'_>) {
        self.stars.clear();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>) {
        self.spawn_stars(ctx);
        self.stars.tick(ctx.now);

        if self.config.blur == 0.0 {
            canvas.fill(self.config.sky_color);
        } else {
            canvas.blur_rows(unit_to_u8(self.config.blur));
            let fade = 55.0 * (2.0 - ctx.audio.vu_ratio.clamp(0.0, 2.0));
            canvas.fade_all_by(fade as u8);
        }

        self.stars.update(ctx.delta_secs());
        self.stars.render(ctx.now, canvas);
    }

    fn serialize(&self) -> Result<Record, EffectError> {
        let mut record = compose_record(&self.base, &self.config)?;
        record.insert(keys::SUBTYPE.into(), K::SUBTYPE.into());
        Ok(record)
    }
}

fn boxed_from_record<K: StarKind>(record: &Record) -> Result<Box<dyn Effect>, EffectError> {
    Ok(Box::new(StarryNightEffect::<K>::from_record(record)?))
}

/// Star kinds by persisted sub-type number
pub fn star_subtypes() -> SubtypeRegistry {
    SubtypeRegistry::new(EffectId::STARRY_NIGHT)
        .with(BasicStar::SUBTYPE, boxed_from_record::<BasicStar>)
        .with(QuietStar::SUBTYPE, boxed_from_record::<QuietStar>)
        .with(SparkleStar::SUBTYPE, boxed_from_record::<SparkleStar>)
        .with(BubblyStar::SUBTYPE, boxed_from_record::<BubblyStar>)
        .with(HotWhiteStar::SUBTYPE, boxed_from_record::<HotWhiteStar>)
}
