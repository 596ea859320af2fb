use core::fmt;

use crate::effect::EffectId;

/// Failures surfaced by effect construction, setup and persistence
#[derive(Debug)]
pub enum EffectError {
    /// `init` could not reserve per-instance buffers
    Allocation { requested: usize },
    /// A record could not be read into the effect's configuration
    MalformedRecord(serde_json::Error),
    /// A serialized effect did not produce a JSON object
    NotARecord,
    UnknownEffect(EffectId),
    UnknownSubtype { effect: EffectId, subtype: u32 },
    DuplicateEffect(EffectId),
    /// The effect cannot draw on the attached layout
    UnsupportedLayout,
    /// Persisted effect list written by an incompatible format version
    UnsupportedListVersion(u32),
    /// A numeric setting decoded to NaN or infinity
    NonFiniteValue(&'static str),
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { requested } => {
                write!(f, "failed to allocate {requested} bytes of effect state")
            }
            Self::MalformedRecord(err) => write!(f, "malformed effect record: {err}"),
            Self::NotARecord => f.write_str("effect did not serialize to a JSON object"),
            Self::UnknownEffect(id) => write!(f, "no effect registered for id {id}"),
            Self::UnknownSubtype { effect, subtype } => {
                write!(f, "effect {effect} has no sub-type {subtype}")
            }
            Self::DuplicateEffect(id) => write!(f, "effect id {id} is already registered"),
            Self::UnsupportedLayout => f.write_str("effect cannot draw on this layout"),
            Self::UnsupportedListVersion(version) => {
                write!(f, "effect list format version {version} is not supported")
            }
            Self::NonFiniteValue(key) => write!(f, "setting {key:?} is not a finite number"),
        }
    }
}

impl From<serde_json::Error> for EffectError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedRecord(err)
    }
}
