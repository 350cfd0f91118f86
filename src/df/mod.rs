//! Distance field generation
//!
//! Handles:
//! - Exact squared distance transform (lower envelope of parabolas)
//! - Dual-field encoding into a normalized 8-bit field
//! - Box-filter downsampling back to the target resolution
//!
//! All working buffers live in a [`DistanceField`] sized once for the
//! largest glyph and reused for every glyph. `reset()` must run before each
//! glyph is drawn into the mask; stale ink would otherwise bleed into the
//! next glyph's field.

pub mod downsample;
pub mod encoder;
pub mod transform;

use crate::error::{try_alloc, DfError};
use encoder::{Grid, InsideScale};
use log::debug;
use transform::Envelope;

/// Buffer dimensions shared by every glyph of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceSize {
    /// Supersampling factor
    pub scale: u32,
    /// Spread in target pixels
    pub spread: u32,
    /// Downsampled (target) width
    pub down_width: u32,
    /// Downsampled (target) height
    pub down_height: u32,
}

impl WorkspaceSize {
    /// Size the workspace for glyph bitmaps up to `max_width × max_height`
    /// working pixels. Working dimensions are an exact multiple of the
    /// target dimensions, so downsampling is a whole-block mean.
    /// Fails if any working dimension does not fit in `u32`.
    pub fn for_glyphs(
        max_width: u32,
        max_height: u32,
        scale: u32,
        spread: u32,
    ) -> Result<Self, DfError> {
        if scale == 0 {
            return Err(DfError::config("scale must be positive"));
        }
        let padded = |extent: u32| {
            spread
                .checked_mul(2)
                .and_then(|pad| extent.div_ceil(scale).checked_add(pad))
                .filter(|down| down.checked_mul(scale).is_some())
        };
        let (Some(down_width), Some(down_height)) = (padded(max_width), padded(max_height)) else {
            return Err(DfError::config(format!(
                "workspace for {}x{} glyphs with spread {} at scale {} is too large",
                max_width, max_height, spread, scale
            )));
        };
        Ok(Self {
            scale,
            spread,
            down_width,
            down_height,
        })
    }

    pub fn width(&self) -> u32 {
        self.down_width * self.scale
    }

    pub fn height(&self) -> u32 {
        self.down_height * self.scale
    }

    /// Spread in working pixels; also the glyph's offset inside the mask
    pub fn working_spread(&self) -> u32 {
        self.spread * self.scale
    }

    /// Target size of a glyph whose bitmap is `width × height` working pixels
    pub fn glyph_cell(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width.div_ceil(self.scale) + 2 * self.spread,
            height.div_ceil(self.scale) + 2 * self.spread,
        )
    }
}

/// Reusable per-run workspace
pub struct DistanceField {
    size: WorkspaceSize,
    /// Binary mask drawn by the rasterizer (0 = background, >0 = ink)
    mask: Vec<u8>,
    /// Squared distances
    dists: Vec<f32>,
    /// Encoded 8-bit field at working resolution
    field: Vec<u8>,
    /// Encoded field at target resolution
    down: Vec<u8>,
    envelope: Envelope,
}

impl DistanceField {
    pub fn new(size: WorkspaceSize) -> Result<Self, DfError> {
        let cells = (size.width() as usize) * (size.height() as usize);
        let down_cells = (size.down_width as usize) * (size.down_height as usize);
        let longest = size.width().max(size.height()) as usize;

        let field = Self {
            size,
            mask: try_alloc("glyph mask", cells)?,
            dists: try_alloc("distance grid", cells)?,
            field: try_alloc("encoded field", cells)?,
            down: try_alloc("downsample target", down_cells)?,
            envelope: Envelope::with_capacity(longest)?,
        };

        debug!(
            "Workspace: {}x{} working, {}x{} target, spread={} (x{})",
            size.width(),
            size.height(),
            size.down_width,
            size.down_height,
            size.spread,
            size.scale
        );

        Ok(field)
    }

    #[allow(dead_code)]
    pub fn size(&self) -> WorkspaceSize {
        self.size
    }

    /// Clear every per-glyph buffer
    pub fn reset(&mut self) {
        self.mask.fill(0);
        self.dists.fill(0.0);
        self.field.fill(0);
        self.down.fill(0);
        self.envelope.clear();
    }

    /// Mask to rasterize into, row-major with `size().width()` columns
    pub fn mask_mut(&mut self) -> &mut [u8] {
        &mut self.mask
    }

    #[allow(dead_code)]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Encoded field at working resolution
    #[allow(dead_code)]
    pub fn field(&self) -> &[u8] {
        &self.field
    }

    /// Encode the current mask into the working-resolution field
    pub fn compute(&mut self) -> InsideScale {
        let spread = self.size.working_spread() as f32;
        let mut grid = Grid {
            mask: &self.mask,
            dists: &mut self.dists,
            field: &mut self.field,
            width: self.size.width() as usize,
            height: self.size.height() as usize,
        };
        encoder::encode(&mut grid, spread, &mut self.envelope)
    }

    /// Shrink the encoded field to target resolution.
    /// Returns the target buffer, `size().down_width` pixels per row.
    pub fn downsample(&mut self) -> Result<&[u8], DfError> {
        downsample::downsample(
            &self.field,
            self.size.width(),
            self.size.height(),
            &mut self.down,
            self.size.down_width,
            self.size.down_height,
        )?;
        Ok(&self.down)
    }
}
