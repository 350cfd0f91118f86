//! Error kinds
//!
//! Every failure the generator can report falls into one of four kinds,
//! plus `BufferSize` for buffers handed over at the wrong size.
//! Atlas overflow is not among them: it truncates the glyph set and is
//! reported through the packer, not as an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DfError {
    /// Working buffer or canvas allocation failed
    #[error("failed to allocate {bytes} bytes for {what}")]
    OutOfMemory { what: &'static str, bytes: usize },

    /// The rasterizer could not produce a glyph (or the font could not be loaded)
    #[error("font error: {0}")]
    Font(String),

    /// Reading or writing a file failed
    #[error("'{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A buffer does not match the dimensions it is used with
    #[error("{what}: expected {expected} bytes, got {actual}")]
    BufferSize {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Invalid configuration value or command line argument
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DfError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DfError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DfError::Config(msg.into())
    }

    pub fn font(msg: impl Into<String>) -> Self {
        DfError::Font(msg.into())
    }
}

/// Allocate a zeroed buffer, reporting failure instead of aborting
pub fn try_alloc<T: Clone + Default>(what: &'static str, len: usize) -> Result<Vec<T>, DfError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| DfError::OutOfMemory {
        what,
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    buf.resize(len, T::default());
    Ok(buf)
}
