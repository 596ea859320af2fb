//! Color types, palettes and compositing primitives.

mod palette;
mod utils;

pub use palette::{BlendMode, Palette, PaletteError};
use smart_leds::{RGB8, hsv::Hsv as HSV};
pub use utils::{
    blend_colors, color_fraction, fade_to_black_by, hsv2rgb, rgb_from_u32, rgb_to_u32,
    saturating_add,
};

pub type Rgb = RGB8;
pub type Hsv = HSV;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Serde adapter persisting a color as a `0xRRGGBB` integer.
pub mod serde_rgb {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Rgb, rgb_from_u32, rgb_to_u32};

    pub fn serialize<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(rgb_to_u32(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
        u32::deserialize(deserializer).map(rgb_from_u32)
    }
}
