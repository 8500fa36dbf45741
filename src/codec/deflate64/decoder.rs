use crate::{
    codec::{deflate64::WINDOW_SIZE, InflateBack, PullStatus, Z_DATA_ERROR},
    util::PartialBuffer,
};
use deflate64::InflaterManaged;

/// Callback-driven deflate64 engine.
#[derive(Debug)]
pub struct Deflate64Decoder {
    inflater: Box<InflaterManaged>,
    window: Box<[u8]>,
    /// Bytes handed over by the input callback; the cursor marks what the inflater has taken.
    pending: PartialBuffer<Vec<u8>>,
}

impl Default for Deflate64Decoder {
    fn default() -> Self {
        Self {
            inflater: Box::new(InflaterManaged::new()),
            window: vec![0; WINDOW_SIZE].into_boxed_slice(),
            pending: PartialBuffer::default(),
        }
    }
}

impl Deflate64Decoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn is_done(&self) -> bool {
        self.inflater.finished() && self.inflater.available_output() == 0
    }

    /// Drop the consumed prefix and append `more`.
    fn refill(&mut self, more: &[u8]) {
        let consumed = self.pending.written().len();
        let buffer = self.pending.get_mut();
        buffer.drain(..consumed);
        buffer.extend_from_slice(more);
        self.pending.reset();
    }
}

impl InflateBack for Deflate64Decoder {
    fn inflate_back<'a>(
        &mut self,
        input: &mut dyn FnMut() -> &'a [u8],
        output: &mut dyn FnMut(&[u8]),
    ) -> PullStatus {
        loop {
            if self.is_done() {
                let trailing = self.pending.unwritten().len();
                if trailing > 0 {
                    tracing::trace!(len = trailing, "discarding bytes after deflate64 stream end");
                }
                self.pending.get_mut().clear();
                self.pending.reset();
                return PullStatus::StreamEnd;
            }

            let result = self
                .inflater
                .inflate(self.pending.unwritten(), &mut self.window);
            self.pending.advance(result.bytes_consumed);

            if result.bytes_written > 0 {
                output(&self.window[..result.bytes_written]);
            }

            if result.data_error {
                return PullStatus::Failed(Z_DATA_ERROR);
            }

            if result.bytes_consumed == 0 && result.bytes_written == 0 && !self.is_done() {
                let more = input();
                if more.is_empty() {
                    return PullStatus::InputExhausted;
                }
                self.refill(more);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Deflate64Decoder;
    use crate::codec::{InflateBack, PullStatus};
    use std::io::Write;

    /// Stored blocks decode identically under deflate and deflate64.
    fn stored(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::none());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn run(decoder: &mut Deflate64Decoder, pieces: &[&[u8]]) -> (Vec<u8>, PullStatus) {
        let mut pieces = pieces.iter().copied();
        let mut output = Vec::new();
        let status = decoder.inflate_back(
            &mut || pieces.next().unwrap_or(&[]),
            &mut |data: &[u8]| output.extend_from_slice(data),
        );
        (output, status)
    }

    #[test]
    fn small_pieces() {
        let data = b"deflate64 pulled in pieces".repeat(100);
        let compressed = stored(&data);
        let pieces: Vec<&[u8]> = compressed.chunks(7).collect();

        let (output, status) = run(&mut Deflate64Decoder::new(), &pieces);
        assert_eq!(status, PullStatus::StreamEnd);
        assert_eq!(output, data);
    }

    #[test]
    fn resumes_after_running_dry() {
        let data = b"resumable".repeat(50);
        let compressed = stored(&data);
        let (head, tail) = compressed.split_at(compressed.len() / 2);

        let mut decoder = Deflate64Decoder::new();
        let (mut output, status) = run(&mut decoder, &[head]);
        assert_eq!(status, PullStatus::InputExhausted);

        let (rest, status) = run(&mut decoder, &[tail]);
        assert_eq!(status, PullStatus::StreamEnd);
        output.extend_from_slice(&rest);
        assert_eq!(output, data);
    }

    #[test]
    fn one_piece_spanning_many_windows() {
        let data: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = stored(&data);

        let mut decoder = Deflate64Decoder::new();
        let (output, status) = run(&mut decoder, &[&compressed]);
        assert_eq!(status, PullStatus::StreamEnd);
        assert_eq!(output, data);
        assert!(decoder.pending.unwritten().is_empty());
        assert!(decoder.pending.written().is_empty());
    }

    #[test]
    fn keeps_unconsumed_bytes_across_refills() {
        let data = b"cursor".repeat(30_000);
        let compressed = stored(&data);
        let pieces: Vec<&[u8]> = compressed.chunks(70_001).collect();

        let (output, status) = run(&mut Deflate64Decoder::new(), &pieces);
        assert_eq!(status, PullStatus::StreamEnd);
        assert_eq!(output, data);
    }

    #[test]
    fn invalid_block_type() {
        let (_, status) = run(&mut Deflate64Decoder::new(), &[&[0xff, 0xff, 0xff, 0xff]]);
        assert!(matches!(status, PullStatus::Failed(_)));
    }
}
