use crate::codec::{Flush, Inflate, Status, Step, Z_DATA_ERROR, Z_NEED_DICT};

use flate2::{Decompress, FlushDecompress};

/// Inflate step engine, headerless or zlib-framed.
#[derive(Debug)]
pub struct FlateDecoder {
    decompress: Decompress,
}

impl FlateDecoder {
    pub(crate) fn new(zlib_header: bool) -> Self {
        Self {
            decompress: Decompress::new(zlib_header),
        }
    }
}

impl Inflate for FlateDecoder {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step {
        // A `Finish` on the very first call makes miniz attempt the whole stream in one go and
        // fail for good if the output buffer is too small. Stream end is reported either way.
        let flush = match flush {
            Flush::None => FlushDecompress::None,
            _ => FlushDecompress::Sync,
        };

        let prior_in = self.decompress.total_in();
        let prior_out = self.decompress.total_out();

        let status = match self.decompress.decompress(input, output, flush) {
            Ok(flate2::Status::Ok) => Status::Ok,
            Ok(flate2::Status::StreamEnd) => Status::StreamEnd,
            Ok(flate2::Status::BufError) => Status::BufError,
            Err(err) if err.needs_dictionary().is_some() => Status::Failed(Z_NEED_DICT),
            Err(err) => {
                tracing::debug!(%err, "inflate step failed");
                Status::Failed(Z_DATA_ERROR)
            }
        };

        Step {
            status,
            consumed: (self.decompress.total_in() - prior_in) as usize,
            produced: (self.decompress.total_out() - prior_out) as usize,
        }
    }
}
