use crate::{
    codec::{gzip::header, gzip::settle, FlateDecoder, Flush, Inflate, Status, Step, Z_DATA_ERROR},
    util::PartialBuffer,
};
use std::io::{Error, ErrorKind, Result};

use flate2::Crc;

#[derive(Debug)]
enum State {
    Header(header::Parser),
    Decoding,
    Footer(PartialBuffer<Vec<u8>>),
    Done,
}

/// Inflate step engine for a single gzip member.
///
/// Bytes following the member are left unconsumed.
#[derive(Debug)]
pub struct GzipDecoder {
    inner: FlateDecoder,
    crc: Crc,
    state: State,
}

fn check_footer(crc: &Crc, input: &[u8]) -> Result<()> {
    if input.len() < 8 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Invalid gzip footer length",
        ));
    }

    let bytes_read = crc.amount().to_le_bytes();
    let crc = crc.sum().to_le_bytes();

    if crc != input[0..4] {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "CRC computed does not match",
        ));
    }

    if bytes_read != input[4..8] {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "amount of bytes read does not match",
        ));
    }

    Ok(())
}

impl GzipDecoder {
    pub(crate) fn new() -> Self {
        Self {
            inner: FlateDecoder::new(false),
            crc: Crc::new(),
            state: State::Header(header::Parser::default()),
        }
    }

    fn process(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        flush: Flush,
    ) -> Result<Status> {
        loop {
            match self.state {
                State::Header(ref mut parser) => {
                    if !parser.input(input)? {
                        return Ok(Status::Ok);
                    }
                    self.state = State::Decoding;
                }

                State::Decoding => {
                    let step = self
                        .inner
                        .step(input.unwritten(), output.unwritten_mut(), flush);
                    input.advance(step.consumed);
                    self.crc.update(&output.unwritten()[..step.produced]);
                    output.advance(step.produced);

                    match step.status {
                        Status::StreamEnd => self.state = State::Footer(vec![0; 8].into()),
                        other => return Ok(other),
                    }
                }

                State::Footer(ref mut footer) => {
                    footer.copy_unwritten_from(input);
                    if !footer.unwritten().is_empty() {
                        return Ok(Status::Ok);
                    }
                    check_footer(&self.crc, footer.written())?;
                    self.state = State::Done;
                }

                State::Done => return Ok(Status::StreamEnd),
            }
        }
    }
}

impl Inflate for GzipDecoder {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step {
        let mut input = PartialBuffer::new(input);
        let mut output = PartialBuffer::new(output);

        let status = match self.process(&mut input, &mut output, flush) {
            Ok(status) => status,
            Err(err) => {
                tracing::debug!(%err, "gzip framing rejected");
                Status::Failed(Z_DATA_ERROR)
            }
        };

        let consumed = input.written().len();
        let produced = output.written().len();
        Step {
            status: settle(status, consumed > 0 || produced > 0),
            consumed,
            produced,
        }
    }
}
