use crate::util::PartialBuffer;
use std::io::{Error, ErrorKind, Result};

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;
const RESERVED: u8 = 0xe0;

/// Optional header fields, in the order they appear on the wire.
const FIELDS: [u8; 4] = [FEXTRA, FNAME, FCOMMENT, FHCRC];

#[derive(Debug)]
enum State {
    Fixed(PartialBuffer<Vec<u8>>),
    ExtraLen(PartialBuffer<Vec<u8>>),
    Extra(usize),
    Name,
    Comment,
    Crc(PartialBuffer<Vec<u8>>),
    Done,
}

/// Incremental gzip member header parser.
#[derive(Debug)]
pub(super) struct Parser {
    state: State,
    flags: u8,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            state: State::Fixed(vec![0; 10].into()),
            flags: 0,
        }
    }
}

fn parse_fixed(input: &[u8]) -> Result<u8> {
    if input[0..3] != [0x1f, 0x8b, 0x08] {
        return Err(Error::new(ErrorKind::InvalidData, "Invalid gzip header"));
    }

    let flags = input[3];
    if flags & RESERVED != 0 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Invalid gzip header flags",
        ));
    }

    Ok(flags)
}

/// The state reading the first optional field present after `previous`, `0` meaning the fixed
/// part of the header.
fn next_field(flags: u8, previous: u8) -> State {
    let start = FIELDS
        .iter()
        .position(|&field| field == previous)
        .map_or(0, |index| index + 1);

    match FIELDS[start..].iter().find(|&&field| flags & field != 0) {
        Some(&FEXTRA) => State::ExtraLen(vec![0; 2].into()),
        Some(&FNAME) => State::Name,
        Some(&FCOMMENT) => State::Comment,
        Some(_) => State::Crc(vec![0; 2].into()),
        None => State::Done,
    }
}

impl Parser {
    /// Consume header bytes from `input`, returning `true` once the header is complete.
    ///
    /// The header CRC, when present, is skipped rather than verified.
    pub(super) fn input(&mut self, input: &mut PartialBuffer<&[u8]>) -> Result<bool> {
        loop {
            match self.state {
                State::Fixed(ref mut fixed) => {
                    fixed.copy_unwritten_from(input);
                    if !fixed.unwritten().is_empty() {
                        return Ok(false);
                    }
                    self.flags = parse_fixed(fixed.written())?;
                    self.state = next_field(self.flags, 0);
                }

                State::ExtraLen(ref mut len) => {
                    len.copy_unwritten_from(input);
                    if !len.unwritten().is_empty() {
                        return Ok(false);
                    }
                    let len = len.written();
                    self.state = State::Extra(u16::from_le_bytes([len[0], len[1]]).into());
                }

                State::Extra(ref mut remaining) => {
                    let skip = (*remaining).min(input.unwritten().len());
                    input.advance(skip);
                    *remaining -= skip;
                    if *remaining > 0 {
                        return Ok(false);
                    }
                    self.state = next_field(self.flags, FEXTRA);
                }

                State::Name | State::Comment => {
                    let field = if let State::Name = self.state {
                        FNAME
                    } else {
                        FCOMMENT
                    };

                    match memchr::memchr(0, input.unwritten()) {
                        Some(end) => {
                            input.advance(end + 1);
                            self.state = next_field(self.flags, field);
                        }
                        None => {
                            input.advance(input.unwritten().len());
                            return Ok(false);
                        }
                    }
                }

                State::Crc(ref mut crc) => {
                    crc.copy_unwritten_from(input);
                    if !crc.unwritten().is_empty() {
                        return Ok(false);
                    }
                    self.state = State::Done;
                }

                State::Done => return Ok(true),
            }
        }
    }
}
