//! Atlas generation pipeline
//!
//! ```text
//! for each char in '!'..='~':
//!   reset workspace → rasterize into padded mask → encode field
//!     → downsample → pack into canvas → record metrics
//! ```
//!
//! One glyph is finished before the next starts; the workspace is sized once
//! for the largest glyph of the range.

use crate::atlas::metadata::FontInfo;
use crate::atlas::{Atlas, AtlasCanvas, PackedGlyph};
use crate::config::AtlasSettings;
use crate::constants::{glyph_range, NUM_CHARS};
use crate::df::{DistanceField, WorkspaceSize};
use crate::error::DfError;
use crate::font::{MaskTarget, Rasterizer};
use log::{debug, info, warn};

/// Result of a generation run
pub struct AtlasBuild {
    pub canvas: AtlasCanvas,
    pub info: FontInfo,
    /// Glyphs the rasterizer could not produce
    pub skipped: Vec<char>,
    /// Glyphs the font has that did not fit into the canvas
    pub dropped: usize,
}

/// Working-pixel metric back to target pixels
fn unscale(value: f32, scale: u32) -> i32 {
    (value / scale as f32).round() as i32
}

/// Largest bitmap over the glyph range
fn max_glyph_extent<R: Rasterizer>(rasterizer: &R) -> (u32, u32) {
    glyph_range()
        .filter_map(|ch| rasterizer.glyph_extent(ch))
        .fold((0, 0), |(mw, mh), (w, h)| (mw.max(w), mh.max(h)))
}

/// Render every glyph of the range into a new atlas
pub fn build_atlas<R: Rasterizer>(
    rasterizer: &R,
    settings: &AtlasSettings,
) -> Result<AtlasBuild, DfError> {
    let (max_w, max_h) = max_glyph_extent(rasterizer);
    let size = WorkspaceSize::for_glyphs(max_w, max_h, settings.scale, settings.spread)?;
    debug!("Largest glyph: {}x{} working pixels", max_w, max_h);

    let mut df = DistanceField::new(size)?;
    let mut atlas = Atlas::new(
        settings.width,
        settings.height,
        settings.padding,
        settings.overflow,
    )?;

    let origin = size.working_spread() as usize;
    let mut skipped = Vec::new();

    for ch in glyph_range() {
        // Past the stop point only count what the font lacks
        if atlas.is_stopped() {
            if rasterizer.glyph_extent(ch).is_none() {
                skipped.push(ch);
            }
            continue;
        }

        df.reset();
        let target = MaskTarget {
            width: size.width() as usize,
            height: size.height() as usize,
            origin,
            pixels: df.mask_mut(),
        };
        let metrics = match rasterizer.rasterize(ch, target) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping '{}': {}", ch, e);
                skipped.push(ch);
                continue;
            }
        };

        df.compute();
        let (cell_w, cell_h) = size.glyph_cell(metrics.width, metrics.height);
        let down = df.downsample()?;

        atlas.insert(PackedGlyph {
            codepoint: ch as u32,
            width: cell_w,
            height: cell_h,
            pixels: down,
            stride: size.down_width as usize,
            x_offset: unscale(metrics.x_offset as f32, settings.scale),
            y_offset: unscale(metrics.y_offset as f32, settings.scale),
            x_advance: unscale(metrics.x_advance, settings.scale),
            y_advance: unscale(metrics.y_advance, settings.scale),
        });
    }

    let line_gap = unscale(rasterizer.line_gap(), settings.scale);
    let (canvas, records) = atlas.into_parts();
    let dropped = NUM_CHARS - skipped.len() - records.len();

    if dropped > 0 {
        warn!(
            "Atlas full: {} of {} glyphs did not fit into {}x{}",
            dropped, NUM_CHARS, settings.width, settings.height
        );
    }
    info!(
        "Glyph atlas generated: {}x{}, {} glyphs",
        canvas.width(),
        canvas.height(),
        records.len()
    );

    Ok(AtlasBuild {
        canvas,
        info: FontInfo {
            ppem: settings.ppem,
            line_gap,
            glyphs: records,
        },
        skipped,
        dropped,
    })
}
