//! Global constants for dffont
//!
//! Consolidates the glyph range and default settings
//! to eliminate magic numbers throughout the codebase.

// ============================================================================
// Glyph Range
// ============================================================================

/// First character rendered into the atlas
pub const FIRST_CHAR: char = '!';

/// Last character rendered into the atlas
pub const LAST_CHAR: char = '~';

/// Number of characters in the atlas range
pub const NUM_CHARS: usize = (LAST_CHAR as usize) - (FIRST_CHAR as usize) + 1;

/// Characters rendered into the atlas, in codepoint order
pub fn glyph_range() -> impl Iterator<Item = char> {
    FIRST_CHAR..=LAST_CHAR
}

// ============================================================================
// Defaults
// ============================================================================

/// Default supersampling scale
pub const DEFAULT_SCALE: u32 = 5;

/// Spread defaults to ppem / SPREAD_DIVISOR, rounded up
pub const SPREAD_DIVISOR: f32 = 14.0;

/// Default output image path
pub const DEFAULT_IMAGE_PATH: &str = "./dffont_image.png";

/// Default output font info path
pub const DEFAULT_INFO_PATH: &str = "./dffont_info";

/// Coverage at or above this value is treated as ink when binarizing
pub const INK_THRESHOLD: u8 = 128;

/// Default spread for a given ppem
pub fn default_spread(ppem: u32) -> u32 {
    (ppem as f32 / SPREAD_DIVISOR).ceil() as u32
}
