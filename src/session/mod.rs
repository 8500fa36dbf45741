//! Incremental codec conversations.
//!
//! A session owns one engine handle plus its output buffer and turns arbitrarily sized writes into
//! bounded engine calls. Output of every [`feed`](Session::feed) is returned as a pooled
//! [`Chunk`](crate::pool::Chunk).
//!
//! Sessions initialize lazily on their first `feed`, release their engine handle exactly once on
//! [`finish`](Session::finish), [`cleanup`](Session::cleanup) or drop, and ignore anything fed
//! after they finished.

use crate::{error::Result, pool::Chunk, FlushMode};
use std::fmt;

mod compressor;
mod decompressor;
mod pull;

pub use self::{
    compressor::{Compressor, CompressorConfig},
    decompressor::{Decompressor, DecompressorConfig},
};

/// Default input and output capacity of a session, in bytes.
pub const DEFAULT_CAPACITY: usize = 32 * 1024;

/// Default number of buffered bytes after which a pull decoder starts draining before the input
/// is finished.
pub const DEFAULT_PULL_THRESHOLD: usize = 32 * 1024;

/// One open codec conversation.
pub trait Session: fmt::Debug {
    /// Create the engine handle and buffers. Called by the first `feed` if not called explicitly;
    /// calling it again is a no-op.
    fn initialize(&mut self) -> Result<()>;

    /// Push `data` through the engine and return whatever output it produced.
    ///
    /// `finish` (or a `flush` of [`FlushMode::Finish`]) terminates the stream; afterwards the
    /// session is finished and further calls return an empty chunk.
    fn feed(&mut self, data: &[u8], finish: bool, flush: FlushMode) -> Result<Chunk>;

    /// Terminate the stream, release the engine and return the final output.
    ///
    /// The engine is released even when finishing fails.
    fn finish(&mut self) -> Result<Chunk>;

    /// Release the engine handle and buffers. Safe to call any number of times.
    fn cleanup(&mut self);

    /// Running CRC-32 over the uncompressed data, when the session tracks one.
    fn checksum(&self) -> Option<u32>;
}
