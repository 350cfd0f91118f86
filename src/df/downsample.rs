//! Box-filter downsampling of an encoded field
//!
//! Delegates to `image::imageops::thumbnail`, which averages every source
//! pixel into the target pixel covering it. With an integer ratio this is
//! an exact block mean.

use crate::error::DfError;
use image::{ImageBuffer, Luma};

/// Shrink a single-channel `width × height` field into `dst`
/// (`dst_width × dst_height`, row-major, tightly packed)
pub fn downsample(
    src: &[u8],
    width: u32,
    height: u32,
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
) -> Result<(), DfError> {
    let expected = (width as usize) * (height as usize);
    let view: ImageBuffer<Luma<u8>, &[u8]> =
        ImageBuffer::from_raw(width, height, src).ok_or(DfError::BufferSize {
            what: "downsample source",
            expected,
            actual: src.len(),
        })?;

    let resized = image::imageops::thumbnail(&view, dst_width, dst_height);
    let raw = resized.as_raw();
    if raw.len() != dst.len() {
        return Err(DfError::BufferSize {
            what: "downsample target",
            expected: raw.len(),
            actual: dst.len(),
        });
    }
    dst.copy_from_slice(raw);
    Ok(())
}
