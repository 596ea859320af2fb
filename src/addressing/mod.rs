//! Logical-to-physical pixel addressing.
//!
//! Every resolver returns `None` for coordinates outside the addressable
//! space; callers skip the write instead of touching foreign memory.

mod fan;
mod matrix;
mod strip;

pub use fan::{FanLayout, PixelOrder};
pub use matrix::{MatrixLayout, MatrixOrder};
pub use strip::{StripLayout, center_len};

/// Physical arrangement of the attached LEDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Strip(StripLayout),
    Matrix(MatrixLayout),
    Fans(FanLayout),
}

impl Layout {
    pub fn strip(len: usize) -> Self {
        Self::Strip(StripLayout::new(len))
    }

    pub fn matrix(width: usize, height: usize) -> Self {
        Self::Matrix(MatrixLayout::new(width, height))
    }

    /// Number of physical pixels every channel buffer must hold
    pub fn led_count(&self) -> usize {
        match self {
            Self::Strip(strip) => strip.len(),
            Self::Matrix(matrix) => matrix.len(),
            Self::Fans(fans) => fans.len(),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Matrix(matrix) => matrix.width(),
            _ => self.led_count(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Matrix(matrix) => matrix.height(),
            _ => 1,
        }
    }

    /// Resolve a 1-D logical offset.
    ///
    /// Strips apply their direction policy; other layouts treat the offset as
    /// the physical index.
    pub fn resolve_offset(&self, offset: i32) -> Option<usize> {
        match self {
            Self::Strip(strip) => strip.resolve(offset),
            _ => {
                let index = usize::try_from(offset).ok()?;
                (index < self.led_count()).then_some(index)
            }
        }
    }

    /// Resolve a 2-D logical coordinate.
    ///
    /// Non-matrix layouts only address row 0.
    pub fn resolve_xy(&self, x: i32, y: i32) -> Option<usize> {
        match self {
            Self::Matrix(matrix) => matrix.resolve(x, y),
            _ if y == 0 => self.resolve_offset(x),
            _ => None,
        }
    }

    /// Physical index that mirrors `index`, if the layout mirrors output
    pub fn mirror_of(&self, index: usize) -> Option<usize> {
        match self {
            Self::Strip(strip) => strip.mirror_of(index),
            _ => None,
        }
    }

    pub fn as_fans(&self) -> Option<&FanLayout> {
        match self {
            Self::Fans(fans) => Some(fans),
            _ => None,
        }
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Self::Matrix(_))
    }
}
