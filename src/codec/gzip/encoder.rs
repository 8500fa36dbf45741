use crate::{
    codec::{gzip::settle, Deflate, FlateEncoder, Flush, Status, Step},
    util::PartialBuffer,
};

use flate2::{Compression, Crc};

#[derive(Debug)]
enum State {
    Header(PartialBuffer<Vec<u8>>),
    Encoding,
    Footer(PartialBuffer<Vec<u8>>),
    Done,
}

/// Deflate step engine producing a single gzip member.
#[derive(Debug)]
pub struct GzipEncoder {
    inner: FlateEncoder,
    crc: Crc,
    state: State,
}

fn header(level: Compression) -> Vec<u8> {
    let level_byte = if level.level() >= Compression::best().level() {
        0x02
    } else if level.level() <= Compression::fast().level() {
        0x04
    } else {
        0x00
    };

    vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, level_byte, 0xff]
}

impl GzipEncoder {
    pub(crate) fn new(level: Compression) -> Self {
        Self {
            inner: FlateEncoder::new(level, false),
            crc: Crc::new(),
            state: State::Header(header(level).into()),
        }
    }

    fn process(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        flush: Flush,
    ) -> Status {
        loop {
            match self.state {
                State::Header(ref mut header) => {
                    output.copy_unwritten_from(header);
                    if !header.unwritten().is_empty() {
                        return Status::Ok;
                    }
                    self.state = State::Encoding;
                }

                State::Encoding => {
                    let step = self
                        .inner
                        .step(input.unwritten(), output.unwritten_mut(), flush);
                    self.crc.update(&input.unwritten()[..step.consumed]);
                    input.advance(step.consumed);
                    output.advance(step.produced);

                    match step.status {
                        Status::StreamEnd => {
                            let mut footer = Vec::with_capacity(8);
                            footer.extend_from_slice(&self.crc.sum().to_le_bytes());
                            footer.extend_from_slice(&self.crc.amount().to_le_bytes());
                            self.state = State::Footer(footer.into());
                        }
                        other => return other,
                    }
                }

                State::Footer(ref mut footer) => {
                    output.copy_unwritten_from(footer);
                    if !footer.unwritten().is_empty() {
                        return Status::Ok;
                    }
                    self.state = State::Done;
                }

                State::Done => return Status::StreamEnd,
            }
        }
    }
}

impl Deflate for GzipEncoder {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Step {
        let mut input = PartialBuffer::new(input);
        let mut output = PartialBuffer::new(output);

        let status = self.process(&mut input, &mut output, flush);

        let consumed = input.written().len();
        let produced = output.written().len();
        Step {
            status: settle(status, consumed > 0 || produced > 0),
            consumed,
            produced,
        }
    }
}
