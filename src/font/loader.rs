//! Font discovery
//!
//! Search order:
//! 1. Explicit path (command line or config file)
//! 2. DFFONT_FONT environment variable
//! 3. Known system paths (hardcoded)

use crate::error::DfError;
use log::{debug, info};
use std::path::{Path, PathBuf};

const SYSTEM_FONTS: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    // macOS (development/testing)
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Load font bytes, returning them with the path they came from
pub fn load_font(explicit: Option<&Path>) -> Result<(Vec<u8>, PathBuf), DfError> {
    if let Some(path) = explicit {
        let data = std::fs::read(path).map_err(|e| DfError::io(path, e))?;
        info!("Font file: {}", path.display());
        return Ok((data, path.to_path_buf()));
    }

    // Custom font can be specified via DFFONT_FONT environment variable
    if let Ok(path) = std::env::var("DFFONT_FONT") {
        let path = PathBuf::from(path);
        let data = std::fs::read(&path).map_err(|e| DfError::io(&path, e))?;
        info!("Font file: {} (DFFONT_FONT)", path.display());
        return Ok((data, path));
    }

    for candidate in SYSTEM_FONTS {
        if let Ok(data) = std::fs::read(candidate) {
            info!("Font file: {} (system)", candidate);
            return Ok((data, PathBuf::from(candidate)));
        }
        debug!("Not found: {}", candidate);
    }

    Err(DfError::font(format!(
        "no font given and no system font found. Checked:\n{}",
        SYSTEM_FONTS.join("\n")
    )))
}
