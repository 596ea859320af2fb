#![no_std]

extern crate alloc;

pub mod addressing;
pub mod audio;
pub mod beat;
pub mod canvas;
pub mod color;
pub mod context;
pub mod effect;
pub mod error;
pub mod frame_scheduler;
pub mod manager;
pub mod math8;
pub mod particles;
pub mod record;
pub mod timer;

pub use addressing::{FanLayout, Layout, MatrixLayout, MatrixOrder, PixelOrder, StripLayout};
pub use audio::{AudioLevel, AudioSnapshot};
pub use beat::{Beat, BeatConfig, BeatDetector, BeatPhase};
pub use canvas::Canvas;
pub use context::FrameContext;
pub use effect::{
    BeatReactive, Effect, EffectBase, EffectId, EffectRegistry, SubtypeRegistry, builtin_registry,
};
pub use error::EffectError;
pub use frame_scheduler::{FrameResult, FrameScheduler, SchedulerConfig};
pub use manager::{EffectManager, EffectSlot, ManagerConfig};
pub use particles::{FadePhases, Particle, ParticleSystem};
pub use record::Record;

pub use color::{BlendMode, Hsv, Palette, Rgb};
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// Every output channel receives the same frame.
pub trait OutputDriver {
    /// Write colors to the LED strip on `channel`
    fn write(&mut self, channel: usize, colors: &[Rgb]);
}
