//! Flat JSON configuration records.
//!
//! A record is one JSON object per effect. Keys shared by every effect are
//! two characters long, effect-specific keys are three. Typed configuration
//! structs are flattened into the same object with serde.
//!
//! Reading is uniform: a missing key takes the field's default, a key with a
//! value of the wrong type rejects the whole record.

use alloc::string::String;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{effect::EffectId, error::EffectError};

pub type Record = Map<String, Value>;

/// Reserved record keys
pub mod keys {
    pub const EFFECT_NUMBER: &str = "en";
    pub const FRIENDLY_NAME: &str = "fn";
    pub const ENABLED: &str = "es";
    pub const MAX_EFFECT_TIME: &str = "mt";
    pub const CORE_EFFECT: &str = "ce";
    pub const REVERSED: &str = "rv";
    pub const MIRRORED: &str = "mr";
    pub const ERASE: &str = "er";
    pub const SPEED: &str = "sp";
    pub const COLOR: &str = "cl";
    pub const PALETTE: &str = "pl";
    pub const BLEND: &str = "bl";
    pub const SIZE: &str = "sz";
    pub const FPS: &str = "fp";
    pub const MAX_SPEED: &str = "ms";
    pub const BLUR: &str = "bu";
    pub const SUBTYPE: &str = "st";

    pub const LIST_VERSION: &str = "v";
    pub const LIST_INTERVAL: &str = "ivl";
    pub const LIST_CURRENT: &str = "cei";
    pub const LIST_EFFECTS: &str = "efs";
}

/// Serialize a typed value into a record
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, EffectError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(EffectError::NotARecord),
    }
}

/// Read a typed value from a record, ignoring keys it does not know
pub fn from_record<T: DeserializeOwned>(record: &Record) -> Result<T, EffectError> {
    Ok(serde_json::from_value(Value::Object(record.clone()))?)
}

/// Reject settings that decoded to NaN or infinity, naming the first offender
pub fn require_finite(fields: &[(&'static str, f32)]) -> Result<(), EffectError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(key, _)) => Err(EffectError::NonFiniteValue(key)),
        None => Ok(()),
    }
}

/// Effect id stored in a record, if present and numeric
pub fn effect_id_of(record: &Record) -> Option<EffectId> {
    record
        .get(keys::EFFECT_NUMBER)
        .and_then(Value::as_u64)
        .and_then(|raw| u32::try_from(raw).ok())
        .map(EffectId::new)
}

/// Inner sub-type number stored in a record
pub fn subtype_of(record: &Record) -> Option<u32> {
    record
        .get(keys::SUBTYPE)
        .and_then(Value::as_u64)
        .and_then(|raw| u32::try_from(raw).ok())
}
