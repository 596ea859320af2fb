/// A 1-D run of pixels with optional reversal and mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    len: usize,
    reversed: bool,
    mirrored: bool,
}

impl StripLayout {
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            reversed: false,
            mirrored: false,
        }
    }

    /// Offset 0 maps to the last physical pixel
    #[must_use]
    pub const fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Every write is duplicated onto the opposite end of the strip
    #[must_use]
    pub const fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub const fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn resolve(&self, offset: i32) -> Option<usize> {
        let offset = usize::try_from(offset).ok()?;
        if offset >= self.len {
            return None;
        }
        Some(if self.reversed {
            self.len - 1 - offset
        } else {
            offset
        })
    }

    /// Resolve with wraparound, so `-1` is the last logical pixel
    pub fn resolve_wrapped(&self, offset: i32) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let len = i32::try_from(self.len).ok()?;
        self.resolve(offset.rem_euclid(len))
    }

    pub fn mirror_of(&self, index: usize) -> Option<usize> {
        if !self.mirrored || index >= self.len {
            return None;
        }
        let mirrored = self.len - 1 - index;
        (mirrored != index).then_some(mirrored)
    }
}

/// Number of pixels in the first half of `count`, rounding up
pub const fn center_len(count: usize) -> usize {
    count / 2 + count % 2
}
