//! Incremental compression sessions and stream adaptors over block-oriented codec engines.
//!

//! The engines underneath (`flate2` for deflate/zlib, `deflate64` for the 64 KiB window variant)
//! only ever see fixed-capacity buffers and return control after every call. This crate turns
//! them into continuous byte streams: arbitrarily large inputs are split into bounded units,
//! output is drained until the engine has nothing left, checksums are tracked for the headerless
//! formats, and engine resources are released exactly once whatever happens.
//!
//! # Layers
//!

//!  Layer | Types
//! -------|------
//!  Sessions | [`Compressor`](session::Compressor), [`Decompressor`](session::Decompressor)
//!  Stream adaptors | [`CompressionStream`](stream::CompressionStream), [`DecompressionStream`](stream::DecompressionStream)
//!  Engine | [`Engine`](codec::Engine), [`EngineRegistry`](codec::EngineRegistry)
//!  Buffers | [`BufferPool`](pool::BufferPool), [`Chunk`](pool::Chunk)
//!

//! # Formats
//!

//!  Format | Compress | Decompress
//! --------|----------|-----------
//!  `raw-deflate` | yes | yes
//!  `zlib-deflate` | yes | yes
//!  `gzip` | yes | yes
#![cfg_attr(
    feature = "deflate64",
    doc = "`deflate64`, `deflate64-raw` | no | yes"
)]
#![cfg_attr(
    not(feature = "deflate64"),
    doc = "`deflate64`, `deflate64-raw` (*inactive*) | no | no"
)]
//!

//! # Example
//!
//! ```
//! use flate_session::{session::{Compressor, Decompressor, Session}, Format, FlushMode};
//!
//! # fn main() -> flate_session::Result<()> {
//! let mut compressor = Compressor::new(Format::Gzip, Default::default());
//! let mut compressed = compressor.feed(b"hello hello hello", false, FlushMode::Auto)?.to_vec();
//! compressed.extend_from_slice(&compressor.finish()?);
//!
//! let mut decompressor = Decompressor::new(Format::Gzip, Default::default());
//! let mut output = decompressor.feed(&compressed, false, FlushMode::Auto)?.to_vec();
//! output.extend_from_slice(&decompressor.finish()?);
//! assert_eq!(output, b"hello hello hello");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_copy_implementations,
    missing_debug_implementations
)]

pub mod codec;
mod error;
mod format;
pub mod pool;
pub mod session;
pub mod stream;
mod util;

pub use crate::error::{Error, Result};
pub use crate::format::{Direction, FlushMode, Format};

/// Level of compression data should be compressed with.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Fastest quality of compression, usually produces bigger size.
    Fastest,
    /// Best quality of compression, usually produces the smallest size.
    Best,
    /// Default quality of compression defined by the selected compression algorithm.
    Default,
    /// Precise quality based on the underlying compression algorithms'
    /// qualities, `0..=9` for deflate. Qualities outside that range are rejected when the
    /// session initializes.
    ///
    /// `Precise(0)` is the identity level: on `raw-deflate` it bypasses the engine entirely.
    Precise(u32),
}

impl Default for Level {
    fn default() -> Self {
        Self::Default
    }
}

impl Level {
    pub(crate) fn is_identity(self) -> bool {
        matches!(self, Self::Precise(0))
    }

    pub(crate) fn into_flate2(self) -> Option<flate2::Compression> {
        match self {
            Self::Fastest => Some(flate2::Compression::fast()),
            Self::Best => Some(flate2::Compression::best()),
            Self::Precise(quality) if quality <= 9 => Some(flate2::Compression::new(quality)),
            Self::Precise(_) => None,
            Self::Default => Some(flate2::Compression::default()),
        }
    }
}
