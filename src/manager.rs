//! The active effect list and its rotation.
//!
//! The manager owns every effect instance, calls `init` once per instance,
//! `start` whenever an effect becomes current and `draw` once per frame. It
//! feeds the beat detector of effects that expose the beat capability before
//! drawing them, and persists the list as one JSON document.

use alloc::{boxed::Box, string::String, vec::Vec};

use embassy_time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    addressing::Layout,
    canvas::Canvas,
    color::Rgb,
    context::FrameContext,
    effect::{DEFAULT_DESIRED_FPS, Effect, EffectId, EffectRegistry},
    error::EffectError,
    record::subtype_of,
};

pub const EFFECT_LIST_VERSION: u32 = 1;

const DEFAULT_INTERVAL_MS: u64 = 30_000;

const fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Time each effect stays current; zero disables rotation
    pub effect_interval: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            effect_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct EffectListDocument {
    #[serde(rename = "v")]
    version: u32,
    #[serde(rename = "ivl", default = "default_interval_ms")]
    interval_ms: u64,
    #[serde(rename = "cei", default)]
    current: usize,
    #[serde(rename = "efs", default)]
    effects: Vec<Value>,
}

/// An effect together with whether `init` succeeded for it
pub struct EffectSlot {
    effect: Box<dyn Effect>,
    ready: bool,
}

impl EffectSlot {
    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    /// Initialised and enabled
    pub fn is_active(&self) -> bool {
        self.ready && self.effect.base().is_enabled()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Identity of a list entry; sub-typed effects share an id
fn list_key(effect: &dyn Effect) -> (EffectId, Option<u32>) {
    let subtype = effect
        .serialize()
        .ok()
        .and_then(|record| subtype_of(&record));
    (effect.id(), subtype)
}

pub struct EffectManager {
    registry: EffectRegistry,
    layout: Layout,
    config: ManagerConfig,
    slots: Vec<EffectSlot>,
    current: usize,
    started_at: Option<Instant>,
    pending_start: bool,
}

impl EffectManager {
    pub fn new(registry: EffectRegistry, layout: Layout, config: ManagerConfig) -> Self {
        Self {
            registry,
            layout,
            config,
            slots: Vec::new(),
            current: 0,
            started_at: None,
            pending_start: true,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.config.effect_interval = interval;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[EffectSlot] {
        &self.slots
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_effect(&self) -> Option<&dyn Effect> {
        self.slots.get(self.current).map(EffectSlot::effect)
    }

    fn make_slot(&self, mut effect: Box<dyn Effect>) -> EffectSlot {
        let ready = match effect.init(&self.layout) {
            Ok(()) => true,
            Err(err) => {
                log::error!("effect {} ({}) failed to init: {err}", effect.name(), effect.id());
                false
            }
        };
        EffectSlot { effect, ready }
    }

    /// Replace the list with the registry's default effects
    pub fn load_defaults(&mut self) {
        let slots: Vec<EffectSlot> = self
            .registry
            .create_defaults()
            .into_iter()
            .map(|effect| self.make_slot(effect))
            .collect();
        self.slots = slots;
        self.current = 0;
        self.settle_current();
        self.request_start();
    }

    /// Replace the list with a persisted document.
    ///
    /// Entries that are not objects, have unknown ids or unreadable fields
    /// are dropped. Default effects whose id and sub-type do not appear in
    /// the document are appended.
    pub fn load_json(&mut self, json: &str) -> Result<(), EffectError> {
        let document: EffectListDocument = serde_json::from_str(json)?;
        if document.version != EFFECT_LIST_VERSION {
            log::warn!(
                "ignoring effect list with format version {}",
                document.version
            );
            return Err(EffectError::UnsupportedListVersion(document.version));
        }

        let mut slots = Vec::with_capacity(document.effects.len());
        for entry in &document.effects {
            let Value::Object(record) = entry else {
                log::warn!("skipping effect list entry that is not an object");
                continue;
            };
            if let Some(effect) = self.registry.create_from_record(record) {
                slots.push(self.make_slot(effect));
            }
        }

        let present: Vec<(EffectId, Option<u32>)> =
            slots.iter().map(|slot| list_key(slot.effect())).collect();
        let missing: Vec<Box<dyn Effect>> = self
            .registry
            .create_defaults()
            .into_iter()
            .filter(|effect| !present.contains(&list_key(&**effect)))
            .collect();
        for effect in missing {
            log::info!("adding default effect {} missing from list", effect.name());
            slots.push(self.make_slot(effect));
        }

        self.slots = slots;
        self.config.effect_interval = Duration::from_millis(document.interval_ms);
        self.current = if document.current < self.slots.len() {
            document.current
        } else {
            0
        };
        self.settle_current();
        self.request_start();
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, EffectError> {
        let effects = self
            .slots
            .iter()
            .map(|slot| slot.effect.serialize().map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        let document = EffectListDocument {
            version: EFFECT_LIST_VERSION,
            interval_ms: self.config.effect_interval.as_millis(),
            current: self.current,
            effects,
        };
        Ok(serde_json::to_string(&document)?)
    }

    /// Initialise and append an effect; effects that fail `init` are refused
    pub fn append_effect(&mut self, mut effect: Box<dyn Effect>) -> Result<usize, EffectError> {
        effect.init(&self.layout)?;
        self.slots.push(EffectSlot {
            effect,
            ready: true,
        });
        if self.slots.len() == 1 {
            self.current = 0;
            self.request_start();
        }
        Ok(self.slots.len() - 1)
    }

    /// Remove a non-core effect
    pub fn delete_effect(&mut self, index: usize) -> Option<Box<dyn Effect>> {
        let slot = self.slots.get(index)?;
        if slot.effect.base().is_core() {
            log::warn!("refusing to delete core effect {}", slot.effect.name());
            return None;
        }

        let removed = self.slots.remove(index);
        if index < self.current {
            self.current -= 1;
        } else if index == self.current {
            if self.current >= self.slots.len() {
                self.current = 0;
            }
            self.settle_current();
            self.request_start();
        }
        Some(removed.effect)
    }

    /// Move an effect within the list; the current effect stays current
    pub fn move_effect(&mut self, from: usize, to: usize) -> bool {
        if from >= self.slots.len() || to >= self.slots.len() {
            return false;
        }
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);

        if self.current == from {
            self.current = to;
        } else if from < self.current && to >= self.current {
            self.current -= 1;
        } else if from > self.current && to <= self.current {
            self.current += 1;
        }
        true
    }

    pub fn enable_effect(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        slot.effect.base_mut().set_enabled(true);
        let active = slot.is_active();
        if active && !self.current_is_active() {
            self.current = index;
            self.request_start();
        }
        true
    }

    /// Disable an effect, moving on if it was current
    pub fn disable_effect(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        slot.effect.base_mut().set_enabled(false);
        if index == self.current {
            self.next_effect();
        }
        true
    }

    pub fn set_current_effect(&mut self, index: usize) -> bool {
        match self.slots.get(index) {
            Some(slot) if slot.is_active() => {
                log::info!("switched to effect {}", slot.effect.name());
                self.current = index;
                self.request_start();
                true
            }
            _ => false,
        }
    }

    /// Advance to the next active effect, wrapping around
    pub fn next_effect(&mut self) {
        self.step(1);
    }

    /// Go back to the previous active effect, wrapping around
    pub fn previous_effect(&mut self) {
        self.step(self.slots.len().saturating_sub(1));
    }

    fn step(&mut self, stride: usize) {
        let len = self.slots.len();
        if len == 0 {
            return;
        }
        let mut index = self.current;
        for _ in 0..len {
            index = (index + stride) % len;
            if self.slots[index].is_active() {
                self.current = index;
                self.request_start();
                log::info!("switched to effect {}", self.slots[index].effect.name());
                return;
            }
        }
    }

    fn current_is_active(&self) -> bool {
        self.slots.get(self.current).is_some_and(EffectSlot::is_active)
    }

    /// Make sure `current` points at an active effect if one exists
    fn settle_current(&mut self) {
        if !self.current_is_active() {
            let len = self.slots.len();
            if let Some(index) = (0..len)
                .map(|offset| (self.current + offset) % len)
                .find(|&i| self.slots[i].is_active())
            {
                self.current = index;
            }
        }
    }

    fn request_start(&mut self) {
        self.pending_start = true;
        self.started_at = None;
    }

    /// How long the current effect stays current, `None` for forever
    pub fn effective_interval(&self) -> Option<Duration> {
        let interval = self.config.effect_interval.as_millis();
        let max_time = self
            .current_effect()
            .map_or(0, |effect| effect.base().max_effect_time_ms());
        match (interval, max_time) {
            (0, 0) => None,
            (0, max) => Some(Duration::from_millis(max)),
            (interval, 0) => Some(Duration::from_millis(interval)),
            (interval, max) => Some(Duration::from_millis(interval.min(max))),
        }
    }

    /// Rotate if the current effect has been showing long enough
    pub fn update(&mut self, now: Instant) {
        let (Some(started_at), Some(interval)) = (self.started_at, self.effective_interval())
        else {
            return;
        };
        if now.saturating_duration_since(started_at) >= interval {
            self.next_effect();
        }
    }

    pub fn desired_fps(&self) -> u32 {
        self.current_effect()
            .map_or(DEFAULT_DESIRED_FPS, |effect| effect.desired_fps())
    }

    /// Render one frame of the current effect into `channels`.
    ///
    /// Without an active effect the channels are cleared.
    pub fn render(&mut self, ctx: &mut FrameContext<'_>, channels: &mut [&mut [Rgb]]) {
        self.update(ctx.now);

        let mut canvas = Canvas::new(channels, &self.layout);
        let Some(slot) = self
            .slots
            .get_mut(self.current)
            .filter(|slot| slot.is_active())
        else {
            canvas.clear();
            return;
        };

        if self.pending_start {
            slot.effect.start(ctx);
            self.pending_start = false;
            self.started_at = Some(ctx.now);
        }
        if let Some(reactive) = slot.effect.as_beat_reactive() {
            reactive.process_audio(ctx);
        }
        slot.effect.draw(ctx, &mut canvas);
    }

    /// Id of every effect in list order
    pub fn effect_ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.slots.iter().map(|slot| slot.effect.id())
    }
}
