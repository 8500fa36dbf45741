use crate::codec::Flush;
use crate::error::Error;
use std::{fmt, str::FromStr};

/// Container format of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Headerless deflate (`raw-deflate`, also accepted as `deflate-raw`).
    RawDeflate,
    /// Deflate wrapped in a zlib header and Adler-32 trailer (`zlib-deflate`, also `deflate`).
    ZlibDeflate,
    /// Deflate wrapped in a gzip member.
    Gzip,
    /// Deflate64, decompression only.
    Deflate64,
    /// Headerless deflate64, decompression only.
    Deflate64Raw,
}

impl Format {
    /// Canonical name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RawDeflate => "raw-deflate",
            Self::ZlibDeflate => "zlib-deflate",
            Self::Gzip => "gzip",
            Self::Deflate64 => "deflate64",
            Self::Deflate64Raw => "deflate64-raw",
        }
    }

    /// Whether the format has no container framing, so the session itself may track a checksum.
    pub fn is_raw(self) -> bool {
        matches!(self, Self::RawDeflate | Self::Deflate64Raw)
    }

    /// Whether the format is decoded through the callback-driven pull engine.
    pub fn is_pull(self) -> bool {
        matches!(self, Self::Deflate64 | Self::Deflate64Raw)
    }

    /// Window bits the engine is configured with, zlib style: negative for headerless deflate,
    /// `+16` for gzip framing. `None` for formats the step engine cannot handle.
    pub fn window_bits(self) -> Option<i32> {
        match self {
            Self::RawDeflate => Some(-15),
            Self::ZlibDeflate => Some(15),
            Self::Gzip => Some(31),
            Self::Deflate64 | Self::Deflate64Raw => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw-deflate" | "deflate-raw" => Ok(Self::RawDeflate),
            "zlib-deflate" | "deflate" => Ok(Self::ZlibDeflate),
            "gzip" => Ok(Self::Gzip),
            "deflate64" => Ok(Self::Deflate64),
            "deflate64-raw" => Ok(Self::Deflate64Raw),
            other => Err(Error::UnsupportedFormat(other.to_owned())),
        }
    }
}

/// Which way a session transforms data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Uncompressed in, compressed out.
    Compress,
    /// Compressed in, uncompressed out.
    Decompress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compress => "compression",
            Self::Decompress => "decompression",
        })
    }
}

/// Flush hint passed along with every fed chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlushMode {
    /// Let the engine buffer as much as it likes.
    None,
    /// Flush pending output up to a byte boundary.
    Partial,
    /// Flush pending output and align to a byte boundary with an empty stored block.
    Sync,
    /// Like `Sync`, and reset the compression dictionary.
    Full,
    /// Terminate the stream.
    Finish,
    /// `None` when compressing, `Sync` when decompressing.
    Auto,
}

impl Default for FlushMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl FlushMode {
    pub(crate) fn resolve(self, direction: Direction) -> Flush {
        match (self, direction) {
            (Self::Auto, Direction::Compress) | (Self::None, Direction::Compress) => Flush::None,
            (Self::Partial, Direction::Compress) => Flush::Partial,
            (Self::Sync, Direction::Compress) => Flush::Sync,
            (Self::Full, Direction::Compress) => Flush::Full,
            (Self::Finish, Direction::Compress) => Flush::Finish,
            // Only the terminal slice of a decompression may carry `Finish`, the session decides
            // that on its own.
            (_, Direction::Decompress) => Flush::Sync,
        }
    }
}

impl FromStr for FlushMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "partial" => Ok(Self::Partial),
            "sync" => Ok(Self::Sync),
            "full" => Ok(Self::Full),
            "finish" => Ok(Self::Finish),
            "auto" => Ok(Self::Auto),
            other => Err(Error::UnsupportedFormat(format!("flush mode {}", other))),
        }
    }
}
