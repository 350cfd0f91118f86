//! Font loading and glyph rasterization
//!
//! Handles:
//! - TTF/OTF font discovery and loading
//! - Rendering glyph outlines into the binary mask (fontdue)
//!
//! The distance field code only sees the [`Rasterizer`] trait, so any
//! outline renderer that can fill a padded mask can drive the pipeline.

pub mod loader;
pub mod raster;

use crate::error::DfError;

pub use loader::load_font;
pub use raster::FontdueRasterizer;

/// Glyph metrics in working (supersampled) pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// Bitmap width
    pub width: u32,
    /// Bitmap height
    pub height: u32,
    /// Offset from the pen position to the bitmap's left edge
    pub x_offset: i32,
    /// Offset from the baseline to the bitmap's top edge (y down)
    pub y_offset: i32,
    pub x_advance: f32,
    pub y_advance: f32,
}

/// Mask a glyph is drawn into: row-major, `width` pixels per row.
/// The glyph's top-left corner goes to (`origin`, `origin`).
pub struct MaskTarget<'a> {
    pub pixels: &'a mut [u8],
    pub width: usize,
    pub height: usize,
    pub origin: usize,
}

impl MaskTarget<'_> {
    /// Whether a `w × h` bitmap fits at the origin
    pub fn fits(&self, w: usize, h: usize) -> bool {
        self.origin + w <= self.width && self.origin + h <= self.height
    }
}

/// Renders glyphs into binary masks at working resolution
pub trait Rasterizer {
    /// Line gap in working pixels
    fn line_gap(&self) -> f32;

    /// Bitmap size of a glyph, or `None` if the font has no such glyph.
    /// Used to size the workspace before any glyph is drawn.
    fn glyph_extent(&self, ch: char) -> Option<(u32, u32)>;

    /// Draw `ch` into `mask` (0 = background, >0 = ink).
    /// The mask is expected to be cleared already.
    fn rasterize(&self, ch: char, mask: MaskTarget<'_>) -> Result<GlyphMetrics, DfError>;
}
