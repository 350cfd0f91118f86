//! fontdue-backed rasterizer
//!
//! Renders at `ppem × scale` pixels and binarizes coverage: anything at or
//! above half coverage is ink.

use super::{GlyphMetrics, MaskTarget, Rasterizer};
use crate::constants::INK_THRESHOLD;
use crate::error::DfError;
use fontdue::{Font, FontSettings};
use log::info;

pub struct FontdueRasterizer {
    font: Font,
    /// Rasterize size (ppem * scale)
    px: f32,
}

impl FontdueRasterizer {
    pub fn new(font_data: &[u8], px: f32) -> Result<Self, DfError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| DfError::font(format!("failed to load font: {}", e)))?;

        info!(
            "Font loaded: {} glyphs, rasterizing at {}px",
            font.glyph_count(),
            px
        );

        Ok(Self { font, px })
    }

    fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }
}

/// Binarize a `width × height` coverage bitmap into the mask at its origin
fn threshold_into(mask: &mut MaskTarget<'_>, coverage: &[u8], width: usize, height: usize) {
    debug_assert!(mask.fits(width, height));
    for y in 0..height {
        let src = &coverage[y * width..(y + 1) * width];
        let start = mask.origin + (mask.origin + y) * mask.width;
        for (dst, &c) in mask.pixels[start..start + width].iter_mut().zip(src) {
            *dst = if c >= INK_THRESHOLD { 255 } else { 0 };
        }
    }
}

/// Baseline to bitmap top (y down) for a bitmap whose bottom sits at `ymin`
fn top_offset(ymin: i32, height: usize) -> i32 {
    -(ymin + height as i32)
}

impl Rasterizer for FontdueRasterizer {
    fn line_gap(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.line_gap)
            .unwrap_or(0.0)
    }

    fn glyph_extent(&self, ch: char) -> Option<(u32, u32)> {
        if !self.has_glyph(ch) {
            return None;
        }
        let m = self.font.metrics(ch, self.px);
        Some((m.width as u32, m.height as u32))
    }

    fn rasterize(&self, ch: char, mut mask: MaskTarget<'_>) -> Result<GlyphMetrics, DfError> {
        if !self.has_glyph(ch) {
            return Err(DfError::font(format!(
                "glyph not found: U+{:04X} '{}'",
                ch as u32, ch
            )));
        }

        let (metrics, bitmap) = self.font.rasterize(ch, self.px);
        let (bw, bh) = (metrics.width, metrics.height);

        if !mask.fits(bw, bh) {
            return Err(DfError::font(format!(
                "glyph U+{:04X} ({}x{}) does not fit the {}x{} mask",
                ch as u32, bw, bh, mask.width, mask.height
            )));
        }

        threshold_into(&mut mask, &bitmap, bw, bh);

        Ok(GlyphMetrics {
            width: bw as u32,
            height: bh as u32,
            x_offset: metrics.xmin,
            y_offset: top_offset(metrics.ymin, bh),
            x_advance: metrics.advance_width,
            y_advance: metrics.advance_height,
        })
    }
}
