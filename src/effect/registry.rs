//! Effect id to constructor mapping.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

use super::{Effect, EffectId};
use crate::{
    error::EffectError,
    record::{Record, effect_id_of, subtype_of},
};

/// Builds an effect with its in-code defaults
pub type DefaultFactory = fn() -> Box<dyn Effect>;

/// Builds an effect from a persisted record
pub type RecordFactory = fn(&Record) -> Result<Box<dyn Effect>, EffectError>;

/// Second-level lookup for effects specialised by an inner type, keyed by
/// the record's sub-type number.
///
/// Records without a sub-type use the first registered one.
#[derive(Clone)]
pub struct SubtypeRegistry {
    effect: EffectId,
    factories: BTreeMap<u32, RecordFactory>,
    fallback: Option<u32>,
}

impl SubtypeRegistry {
    pub fn new(effect: EffectId) -> Self {
        Self {
            effect,
            factories: BTreeMap::new(),
            fallback: None,
        }
    }

    #[must_use]
    pub fn with(mut self, subtype: u32, factory: RecordFactory) -> Self {
        self.factories.insert(subtype, factory);
        self.fallback.get_or_insert(subtype);
        self
    }

    pub fn contains(&self, subtype: u32) -> bool {
        self.factories.contains_key(&subtype)
    }

    pub fn create(&self, record: &Record) -> Result<Box<dyn Effect>, EffectError> {
        let subtype = subtype_of(record)
            .or(self.fallback)
            .unwrap_or_default();
        let factory = self
            .factories
            .get(&subtype)
            .ok_or(EffectError::UnknownSubtype {
                effect: self.effect,
                subtype,
            })?;
        factory(record)
    }
}

#[derive(Clone)]
enum RecordConstructor {
    Direct(RecordFactory),
    Nested(SubtypeRegistry),
}

#[derive(Clone)]
struct Registration {
    name: &'static str,
    default: DefaultFactory,
    record: RecordConstructor,
}

/// Closed set of known effect types
#[derive(Clone, Default)]
pub struct EffectRegistry {
    entries: BTreeMap<EffectId, Registration>,
    defaults: Vec<DefaultFactory>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, id: EffectId, registration: Registration) -> Result<(), EffectError> {
        if self.entries.contains_key(&id) {
            log::warn!("effect id {id} registered twice, keeping the first");
            return Err(EffectError::DuplicateEffect(id));
        }
        self.entries.insert(id, registration);
        Ok(())
    }

    pub fn register(
        &mut self,
        id: EffectId,
        name: &'static str,
        default: DefaultFactory,
        record: RecordFactory,
    ) -> Result<(), EffectError> {
        self.insert(
            id,
            Registration {
                name,
                default,
                record: RecordConstructor::Direct(record),
            },
        )
    }

    /// Register an effect whose records are resolved through `subtypes`
    pub fn register_nested(
        &mut self,
        id: EffectId,
        name: &'static str,
        default: DefaultFactory,
        subtypes: SubtypeRegistry,
    ) -> Result<(), EffectError> {
        self.insert(
            id,
            Registration {
                name,
                default,
                record: RecordConstructor::Nested(subtypes),
            },
        )
    }

    /// Append an instance to the default effect list
    pub fn add_default(&mut self, factory: DefaultFactory) {
        self.defaults.push(factory);
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn name_of(&self, id: EffectId) -> Option<&'static str> {
        self.entries.get(&id).map(|entry| entry.name)
    }

    pub fn ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.entries.keys().copied()
    }

    pub fn create_default(&self, id: EffectId) -> Option<Box<dyn Effect>> {
        self.entries.get(&id).map(|entry| (entry.default)())
    }

    pub fn try_create_from_record(&self, record: &Record) -> Result<Box<dyn Effect>, EffectError> {
        let id = effect_id_of(record).ok_or(EffectError::NotARecord)?;
        let entry = self
            .entries
            .get(&id)
            .ok_or(EffectError::UnknownEffect(id))?;
        match &entry.record {
            RecordConstructor::Direct(factory) => factory(record),
            RecordConstructor::Nested(subtypes) => subtypes.create(record),
        }
    }

    /// Build an effect from a record, or `None` when the id is unknown or
    /// the record cannot be read
    pub fn create_from_record(&self, record: &Record) -> Option<Box<dyn Effect>> {
        match self.try_create_from_record(record) {
            Ok(effect) => Some(effect),
            Err(err @ (EffectError::UnknownEffect(_) | EffectError::UnknownSubtype { .. })) => {
                log::info!("dropping effect record: {err}");
                None
            }
            Err(err) => {
                log::warn!("dropping effect record: {err}");
                None
            }
        }
    }

    /// Fresh instances of the default effect list, in order
    pub fn create_defaults(&self) -> Vec<Box<dyn Effect>> {
        self.defaults.iter().map(|factory| factory()).collect()
    }
}
