//! Concentric ring sets ("fans") repeated along one chain.

use alloc::vec::Vec;

/// Direction in which positions walk around a fan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelOrder {
    #[default]
    Sequential,
    /// Sequential, starting from the last pixel of the fan
    Reverse,
    BottomUp,
    TopDown,
    LeftRight,
    RightLeft,
}

/// Remap tables for the four directional orders, indexed by fan position
#[derive(Debug, Clone, PartialEq, Eq)]
struct OrderTables {
    bottom_up: Vec<u16>,
    top_down: Vec<u16>,
    left_right: Vec<u16>,
    right_left: Vec<u16>,
}

/// `fan_count` identical fans, each made of rings listed outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanLayout {
    fan_count: usize,
    fan_size: usize,
    ring_sizes: Vec<usize>,
    tables: OrderTables,
}

/// Walk across the ring instead of around it: 0, n-1, 1, n-2, 2, ...
fn across_ring_position(pos: usize, ring_size: usize) -> i64 {
    let half = i64::try_from(pos / 2).unwrap_or(i64::MAX);
    let ring = i64::try_from(ring_size).unwrap_or(i64::MAX);
    if pos % 2 == 1 { ring - 1 - half } else { half }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn build_table(fan_size: usize, ring_size: usize, offset: usize) -> Vec<u16> {
    let size = i64::try_from(fan_size).unwrap_or(i64::MAX).max(1);
    let offset = i64::try_from(offset).unwrap_or(0);
    (0..fan_size)
        .map(|pos| (across_ring_position(pos, ring_size) + offset).rem_euclid(size) as u16)
        .collect()
}

impl FanLayout {
    /// `bottom_offset` is the in-fan index of the bottom-most pixel; the other
    /// directions are quarter turns from it.
    ///
    /// Returns `None` when the rings do not fit in a fan or a fan exceeds
    /// `u16::MAX` pixels.
    pub fn new(
        fan_count: usize,
        fan_size: usize,
        ring_sizes: &[usize],
        bottom_offset: usize,
    ) -> Option<Self> {
        if fan_size == 0 || fan_size > usize::from(u16::MAX) {
            return None;
        }
        let ring_sizes: Vec<usize> = if ring_sizes.is_empty() {
            alloc::vec![fan_size]
        } else {
            ring_sizes.to_vec()
        };
        if ring_sizes.iter().sum::<usize>() > fan_size || ring_sizes.contains(&0) {
            return None;
        }

        let outer = ring_sizes[0];
        let tables = OrderTables {
            bottom_up: build_table(fan_size, outer, bottom_offset),
            left_right: build_table(fan_size, outer, bottom_offset + fan_size / 4),
            top_down: build_table(fan_size, outer, bottom_offset + fan_size * 2 / 4),
            right_left: build_table(fan_size, outer, bottom_offset + fan_size * 3 / 4),
        };

        Some(Self {
            fan_count,
            fan_size,
            ring_sizes,
            tables,
        })
    }

    /// Single-ring fans
    pub fn uniform(fan_count: usize, fan_size: usize, bottom_offset: usize) -> Option<Self> {
        Self::new(fan_count, fan_size, &[], bottom_offset)
    }

    pub fn len(&self) -> usize {
        self.fan_count * self.fan_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fan_count(&self) -> usize {
        self.fan_count
    }

    pub fn fan_size(&self) -> usize {
        self.fan_size
    }

    pub fn ring_count(&self) -> usize {
        self.ring_sizes.len()
    }

    pub fn ring_size(&self, ring: usize) -> Option<usize> {
        self.ring_sizes.get(ring).copied()
    }

    /// Resolve a position counted across all fans in the given order
    pub fn resolve(&self, pos: i32, order: PixelOrder) -> Option<usize> {
        let pos = usize::try_from(pos).ok()?;
        if pos >= self.len() {
            return None;
        }
        let fan_pos = pos % self.fan_size;
        let fan_base = pos - fan_pos;

        let in_fan = match order {
            PixelOrder::Sequential => fan_pos,
            PixelOrder::Reverse => self.fan_size - 1 - fan_pos,
            PixelOrder::BottomUp => usize::from(self.tables.bottom_up[fan_pos]),
            PixelOrder::TopDown => usize::from(self.tables.top_down[fan_pos]),
            PixelOrder::LeftRight => usize::from(self.tables.left_right[fan_pos]),
            PixelOrder::RightLeft => usize::from(self.tables.right_left[fan_pos]),
        };
        Some(fan_base + in_fan)
    }

    /// Resolve a position within one fan
    pub fn resolve_in_fan(&self, fan: usize, pos: i32, order: PixelOrder) -> Option<usize> {
        if fan >= self.fan_count || usize::try_from(pos).ok()? >= self.fan_size {
            return None;
        }
        let base = i32::try_from(fan * self.fan_size).ok()?;
        self.resolve(base + pos, order)
    }

    /// Resolve a position on one ring of one fan; positions wrap around the ring
    pub fn resolve_ring(&self, fan: usize, ring: usize, pos: i32) -> Option<usize> {
        if fan >= self.fan_count {
            return None;
        }
        let size = *self.ring_sizes.get(ring).filter(|&&size| size > 0)?;
        let ring_base: usize = self.ring_sizes[..ring].iter().sum();
        let wrapped = usize::try_from(pos.rem_euclid(i32::try_from(size).ok()?)).ok()?;
        Some(fan * self.fan_size + ring_base + wrapped)
    }
}
