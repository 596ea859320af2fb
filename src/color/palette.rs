//! Gradient palettes with nearest-entry or linear sampling.
//!
//! Entries are spaced evenly around a 0-255 circle the way `FastLED`
//! palettes are: entry `k` of an `N`-entry palette sits at `k * 256 / N` and
//! the last entry blends back toward the first.

use alloc::{sync::Arc, vec::Vec};
use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use super::{Rgb, blend_colors, color_fraction, rgb_from_u32, rgb_to_u32};

/// Largest supported palette
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Create a palette table from a list of hex colors (0xRRGGBB format)
macro_rules! hex_palette {
    ($($color:expr),* $(,)?) => {
        [
            $(rgb_from_u32($color)),*
        ]
    };
}

#[allow(clippy::unreadable_literal)]
const RAINBOW_ENTRIES: [Rgb; 16] = hex_palette![
    0xFF0000, 0xD52A00, 0xAB5500, 0xAB7F00, 0xABAB00, 0x56D500, 0x00FF00, 0x00D52A, 0x00AB55,
    0x0056AA, 0x0000FF, 0x2A00D5, 0x5500AB, 0x7F0081, 0xAB0055, 0xD5002B,
];

#[allow(clippy::unreadable_literal)]
const HEAT_ENTRIES: [Rgb; 16] = hex_palette![
    0x000000, 0x330000, 0x660000, 0x990000, 0xCC0000, 0xFF0000, 0xFF3300, 0xFF6600, 0xFF9900,
    0xFFCC00, 0xFFFF00, 0xFFFF33, 0xFFFF66, 0xFFFF99, 0xFFFFCC, 0xFFFFFF,
];

#[allow(clippy::unreadable_literal)]
const OCEAN_ENTRIES: [Rgb; 16] = hex_palette![
    0x191970, 0x00008B, 0x191970, 0x000080, 0x00008B, 0x0000CD, 0x2E8B57, 0x008080, 0x5F9EA0,
    0x0000FF, 0x008B8B, 0x6495ED, 0x7FFFD4, 0x2E8B57, 0x00FFFF, 0x87CEFA,
];

#[allow(clippy::unreadable_literal)]
const FOREST_ENTRIES: [Rgb; 16] = hex_palette![
    0x006400, 0x006400, 0x556B2F, 0x006400, 0x008000, 0x228B22, 0x6B8E23, 0x008000, 0x2E8B57,
    0x66CDAA, 0x32CD32, 0x9ACD32, 0x90EE90, 0x7CFC00, 0x66CDAA, 0x228B22,
];

/// How samples between two entries are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BlendMode {
    /// Nearest entry, no interpolation
    None,
    /// Linear interpolation between the two bracketing entries
    #[default]
    Linear,
}

impl TryFrom<u8> for BlendMode {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Linear),
            _ => Err("blend mode must be 0 or 1"),
        }
    }
}

impl From<BlendMode> for u8 {
    fn from(mode: BlendMode) -> Self {
        match mode {
            BlendMode::None => 0,
            BlendMode::Linear => 1,
        }
    }
}

/// Palette construction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
    Empty,
    TooLarge(usize),
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("palette has no entries"),
            Self::TooLarge(len) => write!(
                f,
                "palette has {len} entries, at most {MAX_PALETTE_ENTRIES} are supported"
            ),
        }
    }
}

/// Immutable color table shared between effects and frames.
///
/// Cloning only bumps a reference count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Arc<[Rgb]>,
    blend: BlendMode,
}

impl Palette {
    pub fn new(entries: &[Rgb], blend: BlendMode) -> Result<Self, PaletteError> {
        match entries.len() {
            0 => Err(PaletteError::Empty),
            len if len > MAX_PALETTE_ENTRIES => Err(PaletteError::TooLarge(len)),
            _ => Ok(Self {
                entries: Arc::from(entries),
                blend,
            }),
        }
    }

    pub fn from_hex(colors: &[u32], blend: BlendMode) -> Result<Self, PaletteError> {
        let entries: Vec<Rgb> = colors.iter().copied().map(rgb_from_u32).collect();
        Self::new(&entries, blend)
    }

    fn builtin(entries: &[Rgb; 16]) -> Self {
        Self {
            entries: Arc::from(&entries[..]),
            blend: BlendMode::Linear,
        }
    }

    pub fn rainbow() -> Self {
        Self::builtin(&RAINBOW_ENTRIES)
    }

    pub fn heat() -> Self {
        Self::builtin(&HEAT_ENTRIES)
    }

    pub fn ocean() -> Self {
        Self::builtin(&OCEAN_ENTRIES)
    }

    pub fn forest() -> Self {
        Self::builtin(&FOREST_ENTRIES)
    }

    #[must_use]
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sample at a 0-255 position using the palette's own blend mode
    pub fn sample(&self, index: u8, brightness: u8) -> Rgb {
        self.sample_fixed(u16::from(index) << 8, brightness, self.blend)
    }

    /// Sample at a 0-255 position with an explicit blend mode
    pub fn sample_with(&self, index: u8, brightness: u8, blend: BlendMode) -> Rgb {
        self.sample_fixed(u16::from(index) << 8, brightness, blend)
    }

    /// Sample at an 8.8 fixed-point position (`0x0100` is one index step).
    ///
    /// Positions that land exactly on an entry return that entry unchanged
    /// before brightness scaling.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample_fixed(&self, position: u16, brightness: u8, blend: BlendMode) -> Rgb {
        let len = self.entries.len();
        let scaled = u32::from(position) * len as u32;
        let segment = (scaled >> 16) as usize % len;
        let frac = ((scaled >> 8) & 0xFF) as u8;
        let next = (segment + 1) % len;

        let color = match blend {
            BlendMode::Linear => blend_colors(self.entries[segment], self.entries[next], frac),
            BlendMode::None if frac >= 128 => self.entries[next],
            BlendMode::None => self.entries[segment],
        };
        color_fraction(color, brightness)
    }
}

impl Serialize for Palette {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|c| rgb_to_u32(*c)))
    }
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let colors = Vec::<u32>::deserialize(deserializer)?;
        Self::from_hex(&colors, BlendMode::Linear).map_err(D::Error::custom)
    }
}
