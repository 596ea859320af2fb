pub use smart_leds::hsv::hsv2rgb;

use crate::{
    color::Rgb,
    math8::{blend8, qadd8, scale8},
};

/// Blend two RGB colors
///
/// # Arguments
/// * `a` - First color
/// * `b` - Second color
/// * `amount_of_b` - Blend factor (0 = all a, 255 = all b)
#[inline]
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: u8) -> Rgb {
    Rgb {
        r: blend8(a.r, b.r, amount_of_b),
        g: blend8(a.g, b.g, amount_of_b),
        b: blend8(a.b, b.b, amount_of_b),
    }
}

/// Per-channel `min(255, dst + src)`
#[inline]
pub fn saturating_add(dst: Rgb, src: Rgb) -> Rgb {
    Rgb {
        r: qadd8(dst.r, src.r),
        g: qadd8(dst.g, src.g),
        b: qadd8(dst.b, src.b),
    }
}

/// Scale every channel by `fraction / 256` (255 keeps the color intact)
#[inline]
pub fn color_fraction(color: Rgb, fraction: u8) -> Rgb {
    Rgb {
        r: scale8(color.r, fraction),
        g: scale8(color.g, fraction),
        b: scale8(color.b, fraction),
    }
}

/// Dim a color toward black by `amount` (0 leaves it unchanged).
///
/// Any non-zero channel strictly decreases for `amount > 0`.
#[inline]
pub fn fade_to_black_by(color: Rgb, amount: u8) -> Rgb {
    color_fraction(color, 255 - amount)
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
#[allow(clippy::cast_possible_truncation)]
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Pack a color back into 0xRRGGBB
#[allow(clippy::cast_lossless)]
pub const fn rgb_to_u32(color: Rgb) -> u32 {
    ((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32
}
