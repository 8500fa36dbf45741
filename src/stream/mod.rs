//! Adaptors between [`Stream`](futures_core::stream::Stream)`<Item = `[`io::Result`](std::io::Result)`<`[`Bytes`](bytes::Bytes)`>>`
//! streams and sessions.
//!
//! Each upstream item is fed to the session as soon as it arrives and whatever output it produced
//! is yielded straight away, so at most one input chunk's worth of output is held at a time. Empty
//! outputs are skipped; there is no relationship between the item boundaries upstream and those
//! of the transformed stream.
//!
//! The session is finished when the upstream stream ends. If anything fails, including the
//! upstream stream itself, the session is released before the error is yielded, and the adaptor
//! ends after that error. Dropping an adaptor part way through releases its session as well.

#[macro_use]
mod macros;
mod generic;

pub(crate) use self::generic::Transform;

use crate::session::{Compressor, CompressorConfig, Decompressor, DecompressorConfig};

adaptor! {
    /// A compressing adaptor.
    ///
    /// Reads uncompressed chunks from the underlying stream and emits compressed chunks.
    CompressionStream<S>(Compressor, CompressorConfig)
}

adaptor! {
    /// A decompressing adaptor.
    ///
    /// Reads compressed chunks from the underlying stream and emits decompressed chunks.
    DecompressionStream<S>(Decompressor, DecompressorConfig)
}
