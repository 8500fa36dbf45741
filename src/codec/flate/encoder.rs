use crate::codec::{Deflate, Flush, Status, Step, Z_STREAM_ERROR};

use flate2::{Compress, Compression, FlushCompress};

/// Deflate step engine, headerless or zlib-framed.
#[derive(Debug)]
pub struct FlateEncoder {
    compress: Compress,
}

impl FlateEncoder {
    pub(crate) fn new(level: Compression, zlib_header: bool) -> Self {
        Self {
            compress: Compress::new(level, zlib_header),
        }
    }
}

impl Deflate for FlateEncoder {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step {
        let flush = match flush {
            Flush::None => FlushCompress::None,
            Flush::Partial => FlushCompress::Partial,
            Flush::Sync => FlushCompress::Sync,
            Flush::Full => FlushCompress::Full,
            Flush::Finish => FlushCompress::Finish,
        };

        let prior_in = self.compress.total_in();
        let prior_out = self.compress.total_out();

        let status = match self.compress.compress(input, output, flush) {
            Ok(flate2::Status::Ok) => Status::Ok,
            Ok(flate2::Status::StreamEnd) => Status::StreamEnd,
            Ok(flate2::Status::BufError) => Status::BufError,
            Err(err) => {
                tracing::debug!(%err, "deflate step failed");
                Status::Failed(Z_STREAM_ERROR)
            }
        };

        Step {
            status,
            consumed: (self.compress.total_in() - prior_in) as usize,
            produced: (self.compress.total_out() - prior_out) as usize,
        }
    }
}
