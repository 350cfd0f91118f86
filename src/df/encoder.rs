//! Dual-field encoder
//!
//! Runs the transform twice over the same mask. The inside phase measures
//! how deep each ink cell sits, the outside phase how far each background
//! cell is from ink. Both are fused into one 8-bit field that peaks in the
//! deepest interior, passes `spread` at the boundary and reaches 0 at
//! `spread` outside it.

use super::transform::{transform, Envelope, FAR};

/// Per-glyph normalization produced by the inside phase and consumed by
/// both phases when quantizing.
///
/// Values are relative to the deepest interior point of the glyph, so two
/// glyphs of different stroke weight are not comparable in absolute terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsideScale {
    max_encoded: f32,
}

impl InsideScale {
    pub fn new(max_encoded: f32) -> Self {
        Self { max_encoded }
    }

    #[allow(dead_code)]
    pub fn max_encoded(&self) -> f32 {
        self.max_encoded
    }

    /// Map an encoded distance to 0..=255.
    /// A glyph without ink (max 0) yields 0; a glyph without background
    /// (infinite depth) saturates at 255.
    pub fn quantize(&self, value: f32) -> u8 {
        if !(self.max_encoded > 0.0) {
            return 0;
        }
        if self.max_encoded.is_infinite() {
            return 255;
        }
        (255.0 * value / self.max_encoded).round().clamp(0.0, 255.0) as u8
    }
}

/// Encoded value of an ink cell at squared depth `dist_sq`
#[inline]
pub fn inside_value(dist_sq: f32, spread: f32) -> f32 {
    dist_sq.sqrt() + spread
}

/// Encoded value of a background cell at squared distance `dist_sq` from
/// ink, or `None` past the spread. Touching the boundary maps to
/// `spread + 1`, the same value as the first interior ring.
#[inline]
pub fn outside_value(dist_sq: f32, spread: f32) -> Option<f32> {
    let dist = dist_sq.sqrt();
    (dist <= spread).then(|| spread + 1.0 - dist)
}

/// Seed background cells as targets: distances come out on ink cells
pub fn seed_inside(mask: &[u8], dists: &mut [f32]) {
    for (d, &m) in dists.iter_mut().zip(mask) {
        *d = if m > 0 { FAR } else { 0.0 };
    }
}

/// Seed ink cells as targets: distances come out on background cells
pub fn seed_outside(mask: &[u8], dists: &mut [f32]) {
    for (d, &m) in dists.iter_mut().zip(mask) {
        *d = if m > 0 { 0.0 } else { FAR };
    }
}

/// Buffers of one `width × height` grid borrowed from the workspace
pub struct Grid<'a> {
    pub mask: &'a [u8],
    pub dists: &'a mut [f32],
    pub field: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

/// Encode `grid.mask` into `grid.field`
pub fn encode(grid: &mut Grid<'_>, spread: f32, envelope: &mut Envelope) -> InsideScale {
    let scale = encode_inside(grid, spread, envelope);
    encode_outside(grid, spread, envelope, scale);
    scale
}

/// Inside phase: writes every cell of the field (background cells get 0)
/// and returns the normalization for the outside phase.
fn encode_inside(grid: &mut Grid<'_>, spread: f32, envelope: &mut Envelope) -> InsideScale {
    seed_inside(grid.mask, grid.dists);
    transform(grid.dists, grid.width, grid.height, envelope);

    let mut max_encoded = 0.0f32;
    for (d, &m) in grid.dists.iter_mut().zip(grid.mask) {
        if m > 0 {
            *d = inside_value(*d, spread);
            max_encoded = max_encoded.max(*d);
        }
    }

    let scale = InsideScale::new(max_encoded);
    for ((out, &d), &m) in grid.field.iter_mut().zip(grid.dists.iter()).zip(grid.mask) {
        *out = if m > 0 { scale.quantize(d) } else { 0 };
    }
    scale
}

/// Outside phase: fills the ramp around the glyph, leaves ink cells alone
fn encode_outside(grid: &mut Grid<'_>, spread: f32, envelope: &mut Envelope, scale: InsideScale) {
    seed_outside(grid.mask, grid.dists);
    transform(grid.dists, grid.width, grid.height, envelope);

    for ((out, &d), &m) in grid.field.iter_mut().zip(grid.dists.iter()).zip(grid.mask) {
        if m > 0 {
            continue;
        }
        if let Some(value) = outside_value(d, spread) {
            *out = scale.quantize(value);
        }
    }
}
