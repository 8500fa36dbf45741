mod decoder;

pub use self::decoder::Deflate64Decoder;

/// Size of the deflate64 sliding window, and of the buffer output is handed over from.
pub(crate) const WINDOW_SIZE: usize = 65536;
