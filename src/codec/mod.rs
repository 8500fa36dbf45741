//! The codec engine seen by sessions.
//!
//! Sessions never touch a compression library directly. They hold a handle created by an
//! [`Engine`] and drive it through one of three calling conventions:
//!
//! * [`Deflate`] and [`Inflate`] are step engines: every call gets a bounded input slice and a
//!   fixed-capacity output buffer and reports how much of each it used.
//! * [`InflateBack`] is a pull engine: a single call runs until the engine is out of input, calling
//!   back into the session for more bytes and to hand over decompressed data.
//!
//! Dropping a handle ends the engine conversation and releases its state.

use crate::{
    error::{Error, Result},
    format::{Direction, Format},
    Level,
};
use once_cell::sync::OnceCell;
use std::{fmt, sync::Arc};

#[cfg(feature = "deflate64")]
mod deflate64;
mod flate;
mod gzip;

#[cfg(feature = "deflate64")]
pub use self::deflate64::Deflate64Decoder;
pub use self::{
    flate::{FlateDecoder, FlateEncoder},
    gzip::{GzipDecoder, GzipEncoder},
};

/// Status code: progress was made.
pub const Z_OK: i32 = 0;
/// Status code: the end of the stream was reached.
pub const Z_STREAM_END: i32 = 1;
/// Status code: a preset dictionary is required.
pub const Z_NEED_DICT: i32 = 2;
/// Status code: inconsistent stream state or invalid parameter.
pub const Z_STREAM_ERROR: i32 = -2;
/// Status code: the input is corrupt.
pub const Z_DATA_ERROR: i32 = -3;
/// Status code: no progress was possible.
pub const Z_BUF_ERROR: i32 = -5;

/// Flush instruction for a single engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flush {
    /// No flush.
    None,
    /// Flush to a byte boundary.
    Partial,
    /// Flush and emit an empty stored block.
    Sync,
    /// Flush and reset the dictionary.
    Full,
    /// Terminate the stream.
    Finish,
}

/// Outcome of a step engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Progress was made, the stream continues.
    Ok,
    /// The end of the stream was reached.
    StreamEnd,
    /// No progress was possible with the buffers given; not an error by itself.
    BufError,
    /// The engine failed with the given code.
    Failed(i32),
}

impl Status {
    /// zlib-style numeric code of the status.
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => Z_OK,
            Self::StreamEnd => Z_STREAM_END,
            Self::BufError => Z_BUF_ERROR,
            Self::Failed(code) => code,
        }
    }
}

/// Result of one [`Deflate::step`] or [`Inflate::step`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Engine status after the call.
    pub status: Status,
    /// Bytes taken from the input slice.
    pub consumed: usize,
    /// Bytes written to the front of the output buffer.
    pub produced: usize,
}

impl Step {
    /// Whether the call moved any bytes at all.
    pub fn progressed(&self) -> bool {
        self.consumed > 0 || self.produced > 0
    }
}

/// Outcome of one [`InflateBack::inflate_back`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullStatus {
    /// The end of the stream was reached.
    StreamEnd,
    /// The input callback returned nothing before the stream ended.
    InputExhausted,
    /// The engine failed with the given code.
    Failed(i32),
}

impl PullStatus {
    /// zlib-style numeric code of the status.
    pub fn code(self) -> i32 {
        match self {
            Self::StreamEnd => Z_STREAM_END,
            Self::InputExhausted => Z_BUF_ERROR,
            Self::Failed(code) => code,
        }
    }
}

/// A compression step engine.
pub trait Deflate: fmt::Debug + Send + Sync {
    /// Compress from `input` into `output`.
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step;
}

/// A decompression step engine.
pub trait Inflate: fmt::Debug + Send + Sync {
    /// Decompress from `input` into `output`.
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step;
}

/// A callback-driven decompression engine.
pub trait InflateBack: fmt::Debug + Send + Sync {
    /// Run the engine until the stream ends, it fails, or `input` returns an empty slice.
    ///
    /// Every slice returned by `input` is taken over entirely. Slices passed to `output` point into
    /// the engine's own window and are only valid for the duration of the callback.
    fn inflate_back<'a>(
        &mut self,
        input: &mut dyn FnMut() -> &'a [u8],
        output: &mut dyn FnMut(&[u8]),
    ) -> PullStatus;
}

/// Constructor for engine handles plus the one-shot checksum function.
pub trait Engine: fmt::Debug + Send + Sync {
    /// Start a compression conversation.
    fn deflate(&self, format: Format, level: Level) -> Result<Box<dyn Deflate>>;

    /// Start a step-driven decompression conversation.
    fn inflate(&self, format: Format) -> Result<Box<dyn Inflate>>;

    /// Start a callback-driven decompression conversation.
    fn inflate_back(&self, format: Format) -> Result<Box<dyn InflateBack>>;

    /// Continue the CRC-32 `crc` over `data`.
    fn crc32(&self, crc: u32, data: &[u8]) -> u32;
}

/// The default engine, backed by `flate2` and `deflate64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlateEngine;

impl Engine for FlateEngine {
    fn deflate(&self, format: Format, level: Level) -> Result<Box<dyn Deflate>> {
        let compression = level.into_flate2().ok_or(Error::InitializationFailed {
            direction: Direction::Compress,
            code: Z_STREAM_ERROR,
        })?;

        match format.window_bits() {
            Some(bits) if bits < 0 => Ok(Box::new(FlateEncoder::new(compression, false))),
            Some(bits) if bits <= 15 => Ok(Box::new(FlateEncoder::new(compression, true))),
            Some(_) => Ok(Box::new(GzipEncoder::new(compression))),
            None => Err(Error::UnsupportedOperation {
                format,
                direction: Direction::Compress,
            }),
        }
    }

    fn inflate(&self, format: Format) -> Result<Box<dyn Inflate>> {
        match format.window_bits() {
            Some(bits) if bits < 0 => Ok(Box::new(FlateDecoder::new(false))),
            Some(bits) if bits <= 15 => Ok(Box::new(FlateDecoder::new(true))),
            Some(_) => Ok(Box::new(GzipDecoder::new())),
            None => Err(Error::InitializationFailed {
                direction: Direction::Decompress,
                code: Z_STREAM_ERROR,
            }),
        }
    }

    #[cfg(feature = "deflate64")]
    fn inflate_back(&self, format: Format) -> Result<Box<dyn InflateBack>> {
        if format.is_pull() {
            Ok(Box::new(Deflate64Decoder::new()))
        } else {
            Err(Error::InitializationFailed {
                direction: Direction::Decompress,
                code: Z_STREAM_ERROR,
            })
        }
    }

    #[cfg(not(feature = "deflate64"))]
    fn inflate_back(&self, format: Format) -> Result<Box<dyn InflateBack>> {
        Err(Error::UnsupportedFormat(format.to_string()))
    }

    fn crc32(&self, crc: u32, data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new_with_initial(crc);
        hasher.update(data);
        hasher.finalize()
    }
}

static ENGINE: OnceCell<Arc<dyn Engine>> = OnceCell::new();

/// Process-wide home of the shared engine.
///
/// The engine is created once, lazily, on first use; every session created without an explicit
/// engine gets a clone of the same `Arc`.
#[derive(Debug, Clone, Copy)]
pub struct EngineRegistry;

impl EngineRegistry {
    /// The shared engine, creating a [`FlateEngine`] if none was installed.
    pub fn global() -> Arc<dyn Engine> {
        ENGINE
            .get_or_init(|| {
                tracing::debug!("initializing default codec engine");
                Arc::new(FlateEngine)
            })
            .clone()
    }

    /// Install `engine` as the shared engine.
    ///
    /// Fails, handing the engine back, if the shared engine was already initialized.
    pub fn install(engine: Arc<dyn Engine>) -> Result<(), Arc<dyn Engine>> {
        ENGINE.set(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_reference_value() {
        let engine = FlateEngine;
        assert_eq!(engine.crc32(0, b"123456789"), 0xCBF4_3926);

        let split = engine.crc32(engine.crc32(0, b"1234"), b"56789");
        assert_eq!(split, 0xCBF4_3926);
        assert_eq!(engine.crc32(7, b""), 7);
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let err = FlateEngine
            .deflate(Format::RawDeflate, Level::Precise(12))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InitializationFailed {
                direction: Direction::Compress,
                code: Z_STREAM_ERROR,
            }
        ));
    }

    #[test]
    fn deflate64_cannot_compress() {
        let err = FlateEngine
            .deflate(Format::Deflate64, Level::Default)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { format: Format::Deflate64, .. }));
    }

    #[test]
    fn registry_hands_out_one_engine() {
        let a = EngineRegistry::global();
        let b = EngineRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(EngineRegistry::install(Arc::new(FlateEngine)).is_err());
    }
}
