//! Atlas image and font info files
//!
//! Outputs are written to a sibling temporary file and renamed into place,
//! so a failed run never leaves a truncated atlas behind. The image and
//! its font info are staged together and only renamed once both are
//! complete.

use super::metadata::FontInfo;
use super::AtlasCanvas;
use crate::error::DfError;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Decoded single-channel atlas image
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Producer of one output file's contents
pub type WriteFn<'a> = Box<dyn FnOnce(&mut BufWriter<File>) -> io::Result<()> + 'a>;

/// Temporary file holding the complete contents of `target`
struct Staged {
    tmp: PathBuf,
    target: PathBuf,
}

impl Staged {
    /// Write through `write` into the temporary sibling of `target`
    fn write<F>(target: &Path, write: F) -> Result<Self, DfError>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    {
        let tmp = temp_path(target);
        let result = File::create(&tmp).and_then(|file| {
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush()?;
            out.get_ref().sync_all()
        });

        match result {
            Ok(()) => Ok(Self {
                tmp,
                target: target.to_path_buf(),
            }),
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                Err(DfError::io(target, e))
            }
        }
    }

    /// Rename into place
    fn commit(self) -> Result<(), DfError> {
        std::fs::rename(&self.tmp, &self.target).map_err(|e| {
            let _ = std::fs::remove_file(&self.tmp);
            DfError::io(&self.target, e)
        })
    }

    fn discard(self) {
        let _ = std::fs::remove_file(&self.tmp);
    }
}

/// Write through `write` into a temporary file, then rename it to `path`
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), DfError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    Staged::write(path, write)?.commit()
}

/// Write several files as one unit: every file is staged before any is
/// renamed. If staging fails nothing is touched; if a rename fails the
/// files already renamed are removed again.
pub fn write_all_atomically(files: Vec<(&Path, WriteFn<'_>)>) -> Result<(), DfError> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, write) in files {
        match Staged::write(path, write) {
            Ok(s) => staged.push(s),
            Err(e) => {
                staged.into_iter().for_each(Staged::discard);
                return Err(e);
            }
        }
    }

    let mut committed: Vec<PathBuf> = Vec::with_capacity(staged.len());
    let mut pending = staged.into_iter();
    while let Some(s) = pending.next() {
        let target = s.target.clone();
        if let Err(e) = s.commit() {
            pending.by_ref().for_each(Staged::discard);
            for path in &committed {
                warn!("Removing {} after failed write", path.display());
                let _ = std::fs::remove_file(path);
            }
            return Err(e);
        }
        committed.push(target);
    }
    Ok(())
}

/// Encode the canvas as an 8-bit grayscale PNG
pub fn encode_png<W: Write>(out: W, canvas: &AtlasCanvas) -> io::Result<()> {
    let mut encoder = png::Encoder::new(out, canvas.width(), canvas.height());
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(encoding_error)?;
    writer
        .write_image_data(canvas.pixels())
        .map_err(encoding_error)?;
    writer.finish().map_err(encoding_error)
}

fn encoding_error(e: png::EncodingError) -> io::Error {
    match e {
        png::EncodingError::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// Save the atlas image and its font info; either both land or neither
pub fn save_atlas(
    image_path: &Path,
    canvas: &AtlasCanvas,
    info_path: &Path,
    info: &FontInfo,
) -> Result<(), DfError> {
    let image: WriteFn = Box::new(|out: &mut BufWriter<File>| encode_png(out, canvas));
    let text: WriteFn = Box::new(|out: &mut BufWriter<File>| info.write_to(out));
    write_all_atomically(vec![(image_path, image), (info_path, text)])?;
    info!(
        "Atlas image saved: {} ({}x{})",
        image_path.display(),
        canvas.width(),
        canvas.height()
    );
    info!(
        "Font info saved: {} ({} glyphs)",
        info_path.display(),
        info.glyphs.len()
    );
    Ok(())
}

/// Load an atlas image; anything but single-channel 8-bit is rejected
pub fn load_png(path: &Path) -> Result<AtlasImage, DfError> {
    use image::io::Reader as ImageReader;

    let to_io = |e: image::ImageError| io::Error::new(io::ErrorKind::InvalidData, e.to_string());

    let img = ImageReader::open(path)
        .map_err(|e| DfError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| DfError::io(path, e))?
        .decode()
        .map_err(|e| DfError::io(path, to_io(e)))?;

    if img.color() != image::ColorType::L8 {
        return Err(DfError::io(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected a single-channel image, got {:?}", img.color()),
            ),
        ));
    }

    let gray = img.into_luma8();
    Ok(AtlasImage {
        width: gray.width(),
        height: gray.height(),
        pixels: gray.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{GlyphRecord, Rect};

    fn sample_info() -> FontInfo {
        FontInfo {
            ppem: 8,
            line_gap: 0,
            glyphs: vec![GlyphRecord {
                codepoint: 33,
                rect: Rect { x: 1, y: 1, w: 3, h: 1 },
                x_offset: 0,
                y_offset: -1,
                x_advance: 3,
                y_advance: 0,
            }],
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dffont_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_png_round_trip() {
        let dir = scratch_dir("png");
        let path = dir.join("atlas.png");

        let mut canvas = AtlasCanvas::new(5, 3).unwrap();
        canvas.blit(Rect { x: 1, y: 1, w: 3, h: 1 }, &[10, 128, 255], 3);
        write_atomically(&path, |out| encode_png(out, &canvas)).unwrap();
        assert!(!temp_path(&path).exists());

        let image = load_png(&path).unwrap();
        assert_eq!((image.width, image.height), (5, 3));
        assert_eq!(image.pixels, canvas.pixels());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let dir = scratch_dir("fail");
        let path = dir.join("info");

        let err = write_atomically(&path, |_| Err(io::Error::new(io::ErrorKind::Other, "boom")));
        assert!(matches!(err, Err(DfError::Io { .. })));
        assert!(!path.exists());
        assert!(!temp_path(&path).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let path = Path::new("/nonexistent/dffont/atlas.png");
        let canvas = AtlasCanvas::new(1, 1).unwrap();
        let err = write_atomically(path, |out| encode_png(out, &canvas));
        assert!(matches!(err, Err(DfError::Io { .. })));
    }

    #[test]
    fn test_save_atlas_writes_both() {
        let dir = scratch_dir("both");
        let image_path = dir.join("atlas.png");
        let info_path = dir.join("atlas_info");

        let canvas = AtlasCanvas::new(5, 3).unwrap();
        save_atlas(&image_path, &canvas, &info_path, &sample_info()).unwrap();

        assert_eq!(load_png(&image_path).unwrap().pixels, canvas.pixels());
        assert_eq!(FontInfo::load(&info_path).unwrap(), sample_info());
        assert!(!temp_path(&image_path).exists());
        assert!(!temp_path(&info_path).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_info_write_leaves_no_image() {
        let dir = scratch_dir("partial");
        let image_path = dir.join("atlas.png");
        let info_path = dir.join("missing").join("atlas_info");

        let canvas = AtlasCanvas::new(5, 3).unwrap();
        let err = save_atlas(&image_path, &canvas, &info_path, &sample_info());
        assert!(matches!(err, Err(DfError::Io { .. })));
        assert!(!image_path.exists());
        assert!(!temp_path(&image_path).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_info_write_keeps_previous_image() {
        let dir = scratch_dir("previous");
        let image_path = dir.join("atlas.png");
        let info_path = dir.join("atlas_info");
        std::fs::write(&image_path, b"previous").unwrap();

        let canvas = AtlasCanvas::new(5, 3).unwrap();
        let image: WriteFn = Box::new(|out: &mut BufWriter<File>| encode_png(out, &canvas));
        let text: WriteFn = Box::new(|_: &mut BufWriter<File>| {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });
        let err = write_all_atomically(vec![(image_path.as_path(), image), (info_path.as_path(), text)]);
        assert!(matches!(err, Err(DfError::Io { .. })));

        assert_eq!(std::fs::read(&image_path).unwrap(), b"previous");
        assert!(!info_path.exists());
        assert!(!temp_path(&image_path).exists());
        assert!(!temp_path(&info_path).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(temp_path(Path::new("out/a.png")), PathBuf::from("out/a.png.tmp"));
    }
}
