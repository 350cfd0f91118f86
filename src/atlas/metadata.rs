//! Font info stream
//!
//! Text contract between the generator and any consumer of the atlas:
//!
//! ```text
//! num_chars=94
//! ppem=32
//! line_gap=0
//! char=33, x=0, y=0, w=9, h=27, xoff=2, yoff=-23, xadv=10, yadv=0
//! ...
//! ```
//!
//! Field order and presence are fixed; one `char=` line per packed glyph.

use super::{GlyphRecord, Rect};
use crate::error::DfError;
use std::io::{self, Write};
use std::path::Path;

const GLYPH_KEYS: [&str; 9] = ["char", "x", "y", "w", "h", "xoff", "yoff", "xadv", "yadv"];

/// Header plus one record per packed glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    /// Base pixels per em the atlas was generated for
    pub ppem: u32,
    /// Line gap in base pixels
    pub line_gap: i32,
    pub glyphs: Vec<GlyphRecord>,
}

impl FontInfo {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "num_chars={}", self.glyphs.len())?;
        writeln!(out, "ppem={}", self.ppem)?;
        writeln!(out, "line_gap={}", self.line_gap)?;
        for g in &self.glyphs {
            writeln!(
                out,
                "char={}, x={}, y={}, w={}, h={}, xoff={}, yoff={}, xadv={}, yadv={}",
                g.codepoint,
                g.rect.x,
                g.rect.y,
                g.rect.w,
                g.rect.h,
                g.x_offset,
                g.y_offset,
                g.x_advance,
                g.y_advance
            )?;
        }
        Ok(())
    }

    /// Parse the text form; malformed input is `InvalidData`
    pub fn parse(text: &str) -> io::Result<Self> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let mut header = |key: &str| -> io::Result<i64> {
            let (n, line) = lines
                .next()
                .ok_or_else(|| invalid(format!("missing '{}' header", key)))?;
            parse_field(line.trim(), key).map_err(|e| invalid(format!("line {}: {}", n + 1, e)))
        };

        let num_chars = header("num_chars")?;
        let ppem = header("ppem")?;
        let line_gap = header("line_gap")?;

        let num_chars = usize::try_from(num_chars).map_err(|_| invalid("negative num_chars"))?;
        let ppem = u32::try_from(ppem).map_err(|_| invalid("ppem out of range"))?;
        let line_gap = i32::try_from(line_gap).map_err(|_| invalid("line_gap out of range"))?;

        let mut glyphs = Vec::with_capacity(num_chars.min(4096));
        for (n, line) in lines {
            let glyph = parse_glyph(line.trim()).map_err(|e| invalid(format!("line {}: {}", n + 1, e)))?;
            glyphs.push(glyph);
        }

        if glyphs.len() != num_chars {
            return Err(invalid(format!(
                "header announces {} glyphs, found {}",
                num_chars,
                glyphs.len()
            )));
        }

        Ok(Self {
            ppem,
            line_gap,
            glyphs,
        })
    }

    /// Read and parse a font info file
    pub fn load(path: &Path) -> Result<Self, DfError> {
        let text = std::fs::read_to_string(path).map_err(|e| DfError::io(path, e))?;
        Self::parse(&text).map_err(|e| DfError::io(path, e))
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn parse_field(part: &str, key: &str) -> Result<i64, String> {
    let (k, v) = part
        .split_once('=')
        .ok_or_else(|| format!("expected '{}=<value>', got '{}'", key, part))?;
    if k.trim() != key {
        return Err(format!("expected '{}', got '{}'", key, k.trim()));
    }
    v.trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}': invalid value for {}", v.trim(), key))
}

fn parse_glyph(line: &str) -> Result<GlyphRecord, String> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != GLYPH_KEYS.len() {
        return Err(format!("expected {} fields, got {}", GLYPH_KEYS.len(), parts.len()));
    }

    let mut values = [0i64; 9];
    for ((value, part), key) in values.iter_mut().zip(&parts).zip(GLYPH_KEYS) {
        *value = parse_field(part.trim(), key)?;
    }

    let unsigned = |i: usize| u32::try_from(values[i]).map_err(|_| format!("{} out of range", GLYPH_KEYS[i]));
    let signed = |i: usize| i32::try_from(values[i]).map_err(|_| format!("{} out of range", GLYPH_KEYS[i]));

    Ok(GlyphRecord {
        codepoint: unsigned(0)?,
        rect: Rect {
            x: unsigned(1)?,
            y: unsigned(2)?,
            w: unsigned(3)?,
            h: unsigned(4)?,
        },
        x_offset: signed(5)?,
        y_offset: signed(6)?,
        x_advance: signed(7)?,
        y_advance: signed(8)?,
    })
}
