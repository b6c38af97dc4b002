//! Compression collaborator for the texture blob
//!
//! The game stores its texture LZ-compressed. The codec itself lives
//! outside this crate; the tileset only needs something implementing
//! [`Compressor`].

use thiserror::Error;

/// Error reported by a compressor implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CompressError(pub String);

/// Progress of a running compression, in input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            100
        } else {
            (self.done as u64 * 100 / self.total as u64) as u32
        }
    }
}

/// Callback invoked on the caller's thread while compressing.
pub type ProgressFn<'a> = &'a mut dyn FnMut(Progress);

/// Opaque byte-buffer compressor/decompressor.
pub trait Compressor {
    /// Compress `data`, reporting progress through `progress` when given.
    fn compress(&self, data: &[u8], progress: Option<ProgressFn<'_>>) -> Result<Vec<u8>, CompressError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError>;
}

/// Stores data unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough {
    /// Bytes between progress reports
    pub chunk: usize,
}

impl Passthrough {
    pub fn new() -> Self {
        Self { chunk: 64 * 1024 }
    }
}

impl Compressor for Passthrough {
    fn compress(&self, data: &[u8], mut progress: Option<ProgressFn<'_>>) -> Result<Vec<u8>, CompressError> {
        let chunk = self.chunk.max(1);
        let mut out = Vec::with_capacity(data.len());
        for piece in data.chunks(chunk) {
            out.extend_from_slice(piece);
            if let Some(report) = progress.as_deref_mut() {
                report(Progress { done: out.len(), total: data.len() });
            }
        }
        if data.is_empty() {
            if let Some(report) = progress.as_deref_mut() {
                report(Progress { done: 0, total: 0 });
            }
        }
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressError> {
        Ok(data.to_vec())
    }
}
