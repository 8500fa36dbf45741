use crate::format::{Direction, Format};
use std::io;

/// Errors raised by sessions and stream adaptors.
///
/// Every variant is fatal to the session that produced it: the engine state may be inconsistent
/// afterwards, so nothing is retried.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The engine rejected the session configuration.
    #[error("{direction} initialization failed: {code}")]
    InitializationFailed {
        /// Which kind of session was being set up.
        direction: Direction,
        /// Engine status code.
        code: i32,
    },

    /// The engine returned an unexpected status while compressing.
    #[error("compression failed: {code}")]
    CompressionFailed {
        /// Engine status code.
        code: i32,
    },

    /// The engine returned an unexpected status while decompressing.
    #[error("decompression failed: {code}")]
    DecompressionFailed {
        /// Engine status code.
        code: i32,
    },

    /// A unit handed to the engine was larger than the session's input capacity.
    #[error("chunk size {len} exceeds buffer size {capacity}")]
    ChunkSizeExceeded {
        /// Length of the offending unit.
        len: usize,
        /// The session's input capacity.
        capacity: usize,
    },

    /// The pull decoder reported a failure.
    #[error("deflate64 decompression failed with error code: {code}")]
    Deflate64Failed {
        /// Engine status code.
        code: i32,
    },

    /// The pull decoder ran out of input before the end of the stream.
    #[error("deflate64 decompression incomplete: expected end of stream but got error code: {code}")]
    Deflate64Incomplete {
        /// Engine status code.
        code: i32,
    },

    /// The CRC-32 of the decompressed data differs from the expected one.
    #[error("CRC32 mismatch: expected {expected:08X}, got {actual:08X}")]
    ChecksumMismatch {
        /// Checksum supplied by the caller.
        expected: u32,
        /// Checksum computed over the decompressed output.
        actual: u32,
    },

    /// The format name is not known, or its codec was not compiled in.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The format does not support the requested direction.
    #[error("unsupported format: {format} cannot be used for {direction}")]
    UnsupportedOperation {
        /// The session format.
        format: Format,
        /// The requested direction.
        direction: Direction,
    },

    /// The session was cleaned up before it finished.
    #[error("session has already been released")]
    Closed,
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::DecompressionFailed { .. }
            | Error::Deflate64Failed { .. }
            | Error::ChecksumMismatch { .. } => io::ErrorKind::InvalidData,
            Error::Deflate64Incomplete { .. } => io::ErrorKind::UnexpectedEof,
            Error::UnsupportedFormat(_) => io::ErrorKind::InvalidInput,
            Error::UnsupportedOperation { .. } => io::ErrorKind::Unsupported,
            Error::InitializationFailed { .. }
            | Error::CompressionFailed { .. }
            | Error::ChunkSizeExceeded { .. }
            | Error::Closed => io::ErrorKind::Other,
        };

        io::Error::new(kind, err)
    }
}
