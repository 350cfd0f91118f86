//! Glyph atlas
//!
//! Places each glyph's downsampled field into a single fixed-size canvas
//! with row/shelf packing, in codepoint order, without repacking.
//! Placed rectangles never overlap and never leave the canvas.

pub mod files;
pub mod metadata;

use crate::error::{try_alloc, DfError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Space kept free around every glyph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Padding {
    /// From `[left, right, top, bottom]`
    pub fn from_array(values: [u32; 4]) -> Self {
        Self {
            left: values[0],
            right: values[1],
            top: values[2],
            bottom: values[3],
        }
    }

    pub fn to_array(self) -> [u32; 4] {
        [self.left, self.right, self.top, self.bottom]
    }
}

/// What to do with a glyph that does not fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Drop the glyph and every glyph after it
    #[default]
    Stop,
    /// Drop only the glyph and keep packing
    Skip,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(Self::Stop),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown overflow policy '{}'", other)),
        }
    }
}

/// Rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Lies fully within a `width × height` area
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// One packed glyph. Metrics are in target (downsampled) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRecord {
    pub codepoint: u32,
    pub rect: Rect,
    /// Horizontal offset from the pen position to the bitmap's left edge
    pub x_offset: i32,
    /// Vertical offset from the baseline to the bitmap's top edge (y down)
    pub y_offset: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

/// Shelf packing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingCursor {
    /// Current X position
    pub x: u32,
    /// Top of the current row
    pub y: u32,
    /// Max height of the current row
    pub row_height: u32,
}

/// Row/shelf packer over a fixed canvas
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    padding: Padding,
    policy: OverflowPolicy,
    cursor: PackingCursor,
    stopped: bool,
    omitted: usize,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32, padding: Padding, policy: OverflowPolicy) -> Self {
        Self {
            width,
            height,
            padding,
            policy,
            cursor: PackingCursor {
                x: padding.left,
                y: padding.top,
                row_height: 0,
            },
            stopped: false,
            omitted: 0,
        }
    }

    #[allow(dead_code)]
    pub fn cursor(&self) -> PackingCursor {
        self.cursor
    }

    /// True once a glyph failed to fit under [`OverflowPolicy::Stop`]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Number of glyphs refused so far
    #[allow(dead_code)]
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Reserve a `w × h` rectangle, or `None` if it does not fit
    pub fn place(&mut self, w: u32, h: u32) -> Option<Rect> {
        if self.stopped {
            self.omitted += 1;
            return None;
        }

        // Move to next row if doesn't fit in current row
        let row_started = self.cursor.x > self.padding.left;
        if row_started && self.cursor.x + w > self.width {
            self.cursor.x = self.padding.left;
            self.cursor.y += self.cursor.row_height + self.padding.top + self.padding.bottom;
            self.cursor.row_height = 0;
        }

        let rect = Rect {
            x: self.cursor.x,
            y: self.cursor.y,
            w,
            h,
        };
        if !rect.fits_within(self.width, self.height) {
            self.omitted += 1;
            if self.policy == OverflowPolicy::Stop {
                self.stopped = true;
            }
            return None;
        }

        self.cursor.row_height = self.cursor.row_height.max(h);
        self.cursor.x += w + self.padding.left + self.padding.right;
        Some(rect)
    }
}

/// Single-channel output image
pub struct AtlasCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AtlasCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self, DfError> {
        let pixels = try_alloc("atlas canvas", (width as usize) * (height as usize))?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy the top-left `rect.w × rect.h` region of `src` (rows of
    /// `src_stride` pixels) to `rect`
    pub fn blit(&mut self, rect: Rect, src: &[u8], src_stride: usize) {
        debug_assert!(rect.fits_within(self.width, self.height));
        debug_assert!(rect.w as usize <= src_stride);
        let w = rect.w as usize;
        let aw = self.width as usize;
        for row in 0..rect.h as usize {
            let src_start = row * src_stride;
            let dst_start = rect.x as usize + (rect.y as usize + row) * aw;
            self.pixels[dst_start..dst_start + w].copy_from_slice(&src[src_start..src_start + w]);
        }
    }
}

/// Canvas, packer and the records of every glyph placed so far
pub struct Atlas {
    canvas: AtlasCanvas,
    packer: ShelfPacker,
    records: Vec<GlyphRecord>,
}

/// Glyph ready to be placed: its target-resolution field and metrics
pub struct PackedGlyph<'a> {
    pub codepoint: u32,
    pub width: u32,
    pub height: u32,
    /// Field pixels, `stride` per row; only the top-left `width × height` is copied
    pub pixels: &'a [u8],
    pub stride: usize,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

impl Atlas {
    pub fn new(
        width: u32,
        height: u32,
        padding: Padding,
        policy: OverflowPolicy,
    ) -> Result<Self, DfError> {
        Ok(Self {
            canvas: AtlasCanvas::new(width, height)?,
            packer: ShelfPacker::new(width, height, padding, policy),
            records: Vec::new(),
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.packer.is_stopped()
    }

    /// Place and copy a glyph. Returns `None` when it does not fit.
    pub fn insert(&mut self, glyph: PackedGlyph<'_>) -> Option<GlyphRecord> {
        let Some(rect) = self.packer.place(glyph.width, glyph.height) else {
            warn!(
                "Atlas overflow: U+{:04X} ({}x{})",
                glyph.codepoint, glyph.width, glyph.height
            );
            return None;
        };

        self.canvas.blit(rect, glyph.pixels, glyph.stride);

        let record = GlyphRecord {
            codepoint: glyph.codepoint,
            rect,
            x_offset: glyph.x_offset,
            y_offset: glyph.y_offset,
            x_advance: glyph.x_advance,
            y_advance: glyph.y_advance,
        };
        debug!(
            "Placed U+{:04X} at ({}, {}) {}x{}",
            glyph.codepoint, rect.x, rect.y, rect.w, rect.h
        );
        self.records.push(record);
        Some(record)
    }

    pub fn into_parts(self) -> (AtlasCanvas, Vec<GlyphRecord>) {
        (self.canvas, self.records)
    }
}
