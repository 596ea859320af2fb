//! Per-frame drawing surface over the output channel buffers.
//!
//! A [`Canvas`] borrows every channel buffer for the duration of one frame.
//! All writes are resolved through the [`Layout`], duplicated onto every
//! channel and onto the mirror pixel when the layout mirrors, and silently
//! dropped when they land outside a buffer.

use libm::{floorf, fmodf};

use crate::{
    addressing::{Layout, PixelOrder},
    color::{BLACK, Rgb, color_fraction, fade_to_black_by, saturating_add},
    math8::{unit_to_u8, wu_weight},
};

/// One corner of a sub-pixel splat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplatTap {
    pub x: i32,
    pub y: i32,
    pub weight: u8,
}

/// Split a fractional coordinate into its four neighbours and their weights.
///
/// Neighbours are ordered `(x, y)`, `(x + 1, y)`, `(x, y + 1)`,
/// `(x + 1, y + 1)`. Each weight falls linearly with the distance from its
/// corner and the four weights sum to 255 within +/- 2.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn subpixel_taps(x: f32, y: f32) -> [SplatTap; 4] {
    let x0 = floorf(x);
    let y0 = floorf(y);
    let fx = ((x - x0) * 256.0).clamp(0.0, 255.0) as u8;
    let fy = ((y - y0) * 256.0).clamp(0.0, 255.0) as u8;
    let (ix, iy) = (x0 as i32, y0 as i32);

    [
        SplatTap {
            x: ix,
            y: iy,
            weight: wu_weight(255 - fx, 255 - fy),
        },
        SplatTap {
            x: ix.saturating_add(1),
            y: iy,
            weight: wu_weight(fx, 255 - fy),
        },
        SplatTap {
            x: ix,
            y: iy.saturating_add(1),
            weight: wu_weight(255 - fx, fy),
        },
        SplatTap {
            x: ix.saturating_add(1),
            y: iy.saturating_add(1),
            weight: wu_weight(fx, fy),
        },
    ]
}

/// Walk a fractional span `[pos, pos + count)` pixel by pixel, yielding the
/// integer position and the share (0.0-1.0] of that pixel it covers.
#[allow(clippy::cast_possible_truncation)]
fn for_each_span_pixel(pos: f32, count: f32, limit: f32, mut f: impl FnMut(i32, f32)) {
    if !pos.is_finite() || count.is_nan() {
        return;
    }
    let (mut pos, mut count) = (pos, count);
    if pos < 0.0 {
        count += pos;
        pos = 0.0;
    }
    if count <= 0.0 || pos >= limit {
        return;
    }

    let first = (1.0 - (pos - floorf(pos))).min(count);
    let mut remaining = count.min(limit - pos);
    let mut index = floorf(pos) as i32;

    if remaining > 0.0 && first > 0.0 {
        f(index, first.min(remaining));
        index = index.saturating_add(1);
        remaining -= first;
    }
    while remaining > 1.0 {
        f(index, 1.0);
        index = index.saturating_add(1);
        remaining -= 1.0;
    }
    if remaining > 0.0 {
        f(index, remaining);
    }
}

pub struct Canvas<'a, 'b> {
    channels: &'a mut [&'b mut [Rgb]],
    layout: &'a Layout,
}

impl<'a, 'b> Canvas<'a, 'b> {
    pub fn new(channels: &'a mut [&'b mut [Rgb]], layout: &'a Layout) -> Self {
        Self { channels, layout }
    }

    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    pub fn led_count(&self) -> usize {
        self.layout.led_count()
    }

    pub fn width(&self) -> usize {
        self.layout.width()
    }

    pub fn height(&self) -> usize {
        self.layout.height()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Physical pixel of the first channel
    pub fn pixel(&self, index: usize) -> Option<Rgb> {
        self.channels.first()?.get(index).copied()
    }

    fn write_physical(&mut self, index: usize, f: impl Fn(Rgb) -> Rgb) {
        let mirror = self.layout.mirror_of(index);
        for channel in self.channels.iter_mut() {
            if let Some(px) = channel.get_mut(index) {
                *px = f(*px);
            }
            if let Some(px) = mirror.and_then(|m| channel.get_mut(m)) {
                *px = f(*px);
            }
        }
    }

    fn write_index(&mut self, index: usize, color: Rgb, merge: bool) {
        if merge {
            self.write_physical(index, |px| saturating_add(px, color));
        } else {
            self.write_physical(index, |_| color);
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        for channel in self.channels.iter_mut() {
            channel.fill(color);
        }
    }

    pub fn clear(&mut self) {
        self.fill(BLACK);
    }

    pub fn set_pixel(&mut self, offset: i32, color: Rgb) {
        if let Some(index) = self.layout.resolve_offset(offset) {
            self.write_index(index, color, false);
        }
    }

    /// Saturating-add `color` onto the pixel at `offset`
    pub fn add_pixel(&mut self, offset: i32, color: Rgb) {
        if let Some(index) = self.layout.resolve_offset(offset) {
            self.write_index(index, color, true);
        }
    }

    pub fn set_xy(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(index) = self.layout.resolve_xy(x, y) {
            self.write_index(index, color, false);
        }
    }

    pub fn add_xy(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(index) = self.layout.resolve_xy(x, y) {
            self.write_index(index, color, true);
        }
    }

    /// Dim every pixel of every channel by `amount` (0 is a no-op)
    pub fn fade_all_by(&mut self, amount: u8) {
        if amount == 0 {
            return;
        }
        for channel in self.channels.iter_mut() {
            for px in channel.iter_mut() {
                *px = fade_to_black_by(*px, amount);
            }
        }
    }

    pub fn fade_pixel_by(&mut self, offset: i32, amount: u8) {
        if let Some(index) = self.layout.resolve_offset(offset) {
            self.write_physical(index, |px| fade_to_black_by(px, amount));
        }
    }

    /// Draw a span of `count` pixels starting at a fractional offset.
    ///
    /// Partially covered end pixels receive a proportional share of `color`.
    /// With `merge` the color is added, otherwise it replaces the pixel.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_pixels_f(&mut self, pos: f32, count: f32, color: Rgb, merge: bool) {
        let layout = self.layout;
        let limit = layout.led_count() as f32;
        for_each_span_pixel(pos, count, limit, |offset, share| {
            if let Some(index) = layout.resolve_offset(offset) {
                self.write_index(index, color_fraction(color, unit_to_u8(share)), merge);
            }
        });
    }

    /// Antialiased point: saturating-add `color` onto the 2x2 block around
    /// `(x, y)` weighted by distance. Off-canvas corners are skipped.
    #[allow(clippy::cast_precision_loss)]
    pub fn splat_subpixel(&mut self, x: f32, y: f32, color: Rgb) {
        let (width, height) = (self.width() as f32, self.height() as f32);
        if !(x.is_finite() && y.is_finite())
            || x <= -1.0
            || y <= -1.0
            || x >= width
            || y >= height
        {
            return;
        }
        for tap in subpixel_taps(x, y) {
            if tap.weight == 0 {
                continue;
            }
            if let Some(index) = self.layout.resolve_xy(tap.x, tap.y) {
                self.write_index(index, color_fraction(color, tap.weight), true);
            }
        }
    }

    /// Add a fractional span of fan pixels walked in `order`.
    ///
    /// Requests past the end of the fans are dropped whole.
    #[allow(clippy::cast_precision_loss)]
    pub fn draw_fan_pixels(
        &mut self,
        pos: f32,
        count: f32,
        color: Rgb,
        order: PixelOrder,
        fan: usize,
    ) {
        let layout = self.layout;
        let Some(fans) = layout.as_fans() else {
            return;
        };
        let start = pos + (fan * fans.fan_size()) as f32;
        let limit = fans.len() as f32;
        if count < 0.0 || start + count > limit {
            log::debug!("fan span {start}+{count} exceeds {limit} pixels");
            return;
        }
        for_each_span_pixel(start, count, limit, |p, share| {
            if let Some(index) = fans.resolve(p, order) {
                self.write_index(index, color_fraction(color, unit_to_u8(share)), true);
            }
        });
    }

    /// Draw a fractional span on one ring of one fan; the span wraps around
    /// the ring.
    #[allow(clippy::cast_precision_loss)]
    pub fn draw_ring_pixels(
        &mut self,
        pos: f32,
        count: f32,
        color: Rgb,
        fan: usize,
        ring: usize,
        merge: bool,
    ) {
        let layout = self.layout;
        let Some(fans) = layout.as_fans() else {
            return;
        };
        let Some(ring_size) = fans.ring_size(ring) else {
            log::debug!("ring {ring} does not exist");
            return;
        };
        if ring_size == 0
            || count.is_nan()
            || count < 0.0
            || count > ring_size as f32
            || !pos.is_finite()
        {
            log::debug!("ring span {pos}+{count} does not fit ring {ring}");
            return;
        }
        let size = ring_size as f32;
        let pos = fmodf(pos, size);
        let pos = if pos < 0.0 { pos + size } else { pos };
        for_each_span_pixel(pos, count, f32::MAX, |p, share| {
            if let Some(index) = fans.resolve_ring(fan, ring, p) {
                self.write_index(index, color_fraction(color, unit_to_u8(share)), merge);
            }
        });
    }

    /// One-dimensional blur over each channel's physical order.
    ///
    /// Every pixel keeps `255 - amount` of itself and leaks half of
    /// `amount` to each neighbour.
    pub fn blur_rows(&mut self, amount: u8) {
        let keep = 255 - amount;
        let seep = amount >> 1;
        let width = self.layout.width().max(1);
        for channel in self.channels.iter_mut() {
            for row in channel.chunks_mut(width) {
                let mut carry = BLACK;
                for i in 0..row.len() {
                    let cur = row[i];
                    let part = color_fraction(cur, seep);
                    let kept = color_fraction(cur, keep);
                    row[i] = saturating_add(kept, carry);
                    if i > 0 {
                        row[i - 1] = saturating_add(row[i - 1], part);
                    }
                    carry = part;
                }
            }
        }
    }
}
