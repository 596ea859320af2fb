//! Effect contract and the built-in effect catalog.
//!
//! Every effect is a boxed [`Effect`] trait object created by the
//! [`EffectRegistry`] from a stable numeric [`EffectId`]. Beat reaction is a
//! separate capability ([`BeatReactive`]) discovered through
//! [`Effect::as_beat_reactive`].

mod color_beat;
mod color_fill;
mod fire;
mod palette;
mod rainbow;
mod registry;
mod starry_night;
mod wandering_dots;

use alloc::{boxed::Box, string::String};
use core::fmt;

pub use color_beat::{ColorBeatConfig, ColorBeatEffect};
pub use color_fill::{ColorFillConfig, ColorFillEffect};
pub use fire::{ClassicFireConfig, ClassicFireEffect};
pub use palette::{PaletteConfig, PaletteEffect};
pub use rainbow::{RainbowFillConfig, RainbowFillEffect};
pub use registry::{DefaultFactory, EffectRegistry, RecordFactory, SubtypeRegistry};
use serde::{Deserialize, Serialize};
pub use starry_night::{
    BasicStar, BubblyStar, HotWhiteStar, QuietStar, SparkleStar, Star, StarCore, StarKind,
    StarryNightConfig, StarryNightEffect, star_subtypes,
};
pub use wandering_dots::{Dot, WanderingDotsConfig, WanderingDotsEffect};

use crate::{
    addressing::Layout,
    beat::{Beat, BeatDetector},
    canvas::Canvas,
    context::FrameContext,
    error::EffectError,
    record::{Record, from_record, to_record},
};

/// Frame rate effects ask for unless they say otherwise
pub const DEFAULT_DESIRED_FPS: u32 = 30;

/// Fastest motion any effect draws, in pixels per second
pub const MAX_PIXELS_PER_SECOND: f32 = 10_000.0;

/// Stable, persisted effect type number. Never reassign a shipped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(u32);

impl EffectId {
    pub const COLOR_FILL: Self = Self(1);
    pub const RAINBOW_FILL: Self = Self(2);
    pub const PALETTE: Self = Self(3);
    pub const CLASSIC_FIRE: Self = Self(4);
    pub const STARRY_NIGHT: Self = Self(5);
    pub const COLOR_BEAT: Self = Self(6);
    pub const WANDERING_DOTS: Self = Self(7);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persists `bool` as `1` / `0`
mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        u8::deserialize(deserializer).map(|v| v != 0)
    }
}

const fn enabled_by_default() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Fields every effect persists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectBase {
    #[serde(rename = "en")]
    id: EffectId,
    #[serde(rename = "fn", default)]
    name: String,
    #[serde(rename = "es", default = "enabled_by_default", with = "int_bool")]
    enabled: bool,
    /// Longest time the effect stays current before rotation, 0 = no limit
    #[serde(rename = "mt", default, skip_serializing_if = "is_zero")]
    max_effect_time_ms: u64,
    /// Core effects cannot be deleted from the effect list
    #[serde(rename = "ce", default, skip_serializing_if = "is_false")]
    core: bool,
}

impl EffectBase {
    pub fn new(id: EffectId, name: &str) -> Self {
        Self {
            id,
            name: String::from(name),
            enabled: true,
            max_effect_time_ms: 0,
            core: false,
        }
    }

    pub fn from_record(record: &Record) -> Result<Self, EffectError> {
        from_record(record)
    }

    #[must_use]
    pub fn with_max_effect_time_ms(mut self, max_effect_time_ms: u64) -> Self {
        self.max_effect_time_ms = max_effect_time_ms;
        self
    }

    #[must_use]
    pub fn with_core(mut self, core: bool) -> Self {
        self.core = core;
        self
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = String::from(name);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_core(&self) -> bool {
        self.core
    }

    pub fn mark_core(&mut self) {
        self.core = true;
    }

    pub fn max_effect_time_ms(&self) -> u64 {
        self.max_effect_time_ms
    }

    pub fn set_max_effect_time_ms(&mut self, max_effect_time_ms: u64) {
        self.max_effect_time_ms = max_effect_time_ms;
    }
}

/// Merge the base fields and an effect's own configuration into one record
pub fn compose_record<C: Serialize>(base: &EffectBase, config: &C) -> Result<Record, EffectError> {
    let mut record = to_record(base)?;
    record.extend(to_record(config)?);
    Ok(record)
}

/// Lifecycle shared by every effect.
///
/// The scheduler calls [`init`](Effect::init) once after construction,
/// [`start`](Effect::start) each time the effect becomes current and
/// [`draw`](Effect::draw) once per frame while it is current.
pub trait Effect {
    fn base(&self) -> &EffectBase;

    fn base_mut(&mut self) -> &mut EffectBase;

    fn id(&self) -> EffectId {
        self.base().id()
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    /// Size per-instance state to the layout. Must run before the first draw.
    fn init(&mut self, _layout: &Layout) -> Result<(), EffectError> {
        Ok(())
    }

    /// Reset transient state on (re)activation
    fn start(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Render one frame. Each effect either clears the canvas first or
    /// relies on fading the previous frame.
    fn draw(&mut self, ctx: &mut FrameContext<'_>, canvas: &mut Canvas<'_, '_>);

    /// Current configuration as a record readable by the effect's record
    /// factory
    fn serialize(&self) -> Result<Record, EffectError> {
        to_record(self.base())
    }

    /// Upper bound the scheduler should honour, not a guarantee
    fn desired_fps(&self) -> u32 {
        DEFAULT_DESIRED_FPS
    }

    fn as_beat_reactive(&mut self) -> Option<&mut dyn BeatReactive> {
        None
    }
}

/// Optional capability of effects that react to beats
pub trait BeatReactive {
    fn beat_detector(&mut self) -> &mut BeatDetector;

    fn handle_beat(&mut self, beat: &Beat, ctx: &mut FrameContext<'_>);

    /// Feed the frame's audio snapshot to the detector and dispatch a beat
    fn process_audio(&mut self, ctx: &mut FrameContext<'_>) -> Option<Beat> {
        let beat = self
            .beat_detector()
            .process(ctx.now, ctx.audio.vu_ratio)?;
        self.handle_beat(&beat, ctx);
        Some(beat)
    }
}

/// Every built-in effect plus the default effect list
pub fn builtin_registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    let entries: [(EffectId, &'static str, DefaultFactory, RecordFactory); 6] = [
        (
            EffectId::COLOR_FILL,
            "color fill",
            || Box::new(ColorFillEffect::default()),
            |r| Ok(Box::new(ColorFillEffect::from_record(r)?)),
        ),
        (
            EffectId::RAINBOW_FILL,
            "rainbow fill",
            || Box::new(RainbowFillEffect::default()),
            |r| Ok(Box::new(RainbowFillEffect::from_record(r)?)),
        ),
        (
            EffectId::PALETTE,
            "palette",
            || Box::new(PaletteEffect::default()),
            |r| Ok(Box::new(PaletteEffect::from_record(r)?)),
        ),
        (
            EffectId::CLASSIC_FIRE,
            "classic fire",
            || Box::new(ClassicFireEffect::default()),
            |r| Ok(Box::new(ClassicFireEffect::from_record(r)?)),
        ),
        (
            EffectId::COLOR_BEAT,
            "color beat",
            || Box::new(ColorBeatEffect::default()),
            |r| Ok(Box::new(ColorBeatEffect::from_record(r)?)),
        ),
        (
            EffectId::WANDERING_DOTS,
            "wandering dots",
            || Box::new(WanderingDotsEffect::default()),
            |r| Ok(Box::new(WanderingDotsEffect::from_record(r)?)),
        ),
    ];
    for (id, name, default, record) in entries {
        // Ids above are distinct
        let _ = registry.register(id, name, default, record);
    }
    let _ = registry.register_nested(
        EffectId::STARRY_NIGHT,
        "starry night",
        || Box::new(StarryNightEffect::<BasicStar>::default()),
        star_subtypes(),
    );

    registry.add_default(|| Box::new(RainbowFillEffect::default()));
    registry.add_default(|| Box::new(PaletteEffect::default()));
    registry.add_default(|| Box::new(ClassicFireEffect::default()));
    registry.add_default(|| Box::new(StarryNightEffect::<BasicStar>::default()));
    registry.add_default(|| Box::new(StarryNightEffect::<BubblyStar>::default()));
    registry.add_default(|| Box::new(ColorBeatEffect::default()));
    registry.add_default(|| Box::new(WanderingDotsEffect::default()));
    registry.add_default(|| {
        let mut fill = ColorFillEffect::default();
        fill.base_mut().mark_core();
        Box::new(fill)
    });
    registry
}
