#![allow(dead_code, unused_macros)] // Different tests use a different subset of functions

mod input_stream;

pub use self::input_stream::InputStream;

use bytes::Bytes;
use flate_session::{
    session::{Compressor, CompressorConfig, Decompressor, DecompressorConfig, Session},
    stream::{CompressionStream, DecompressionStream},
    FlushMode, Format,
};
use futures::{executor::block_on_stream, stream::Stream};
use rand::RngCore as _;
use std::io::{self, Read};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0; len];
    rand::rng().fill_bytes(&mut data);
    data
}

/// Text-like data that compresses well but is not a single repeated byte.
pub fn text(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

fn read_to_vec(mut read: impl Read) -> Vec<u8> {
    let mut output = vec![];
    read.read_to_end(&mut output).unwrap();
    output
}

/// Reference codecs built on `flate2`'s synchronous API.
pub mod sync {
    use super::read_to_vec;
    use flate2::{bufread, Compression};
    use flate_session::Format;

    pub fn compress(format: Format, bytes: &[u8]) -> Vec<u8> {
        match format {
            Format::RawDeflate => read_to_vec(bufread::DeflateEncoder::new(bytes, Compression::fast())),
            Format::ZlibDeflate => read_to_vec(bufread::ZlibEncoder::new(bytes, Compression::fast())),
            Format::Gzip => read_to_vec(bufread::GzEncoder::new(bytes, Compression::fast())),
            other => panic!("no reference encoder for {}", other),
        }
    }

    /// Raw deflate made only of stored blocks, which deflate64 decodes identically.
    pub fn stored(bytes: &[u8]) -> Vec<u8> {
        read_to_vec(bufread::DeflateEncoder::new(bytes, Compression::none()))
    }

    pub fn decompress(format: Format, bytes: &[u8]) -> Vec<u8> {
        match format {
            Format::RawDeflate => read_to_vec(bufread::DeflateDecoder::new(bytes)),
            Format::ZlibDeflate => read_to_vec(bufread::ZlibDecoder::new(bytes)),
            Format::Gzip => read_to_vec(bufread::GzDecoder::new(bytes)),
            other => panic!("no reference decoder for {}", other),
        }
    }
}

/// Drive whole sessions synchronously.
pub mod session {
    use super::*;

    /// Feed `input` in pieces of `write_size` bytes, then finish.
    pub fn compress(format: Format, config: CompressorConfig, input: &[u8], write_size: usize) -> Vec<u8> {
        let mut session = Compressor::new(format, config);
        let mut output = Vec::new();
        for piece in input.chunks(write_size.max(1)) {
            output.extend_from_slice(&session.feed(piece, false, FlushMode::Auto).unwrap());
        }
        output.extend_from_slice(&session.finish().unwrap());
        output
    }

    /// Feed `input` in pieces of `write_size` bytes, then finish.
    pub fn decompress(
        format: Format,
        config: DecompressorConfig,
        input: &[u8],
        write_size: usize,
    ) -> flate_session::Result<Vec<u8>> {
        let mut session = Decompressor::new(format, config);
        let mut output = Vec::new();
        for piece in input.chunks(write_size.max(1)) {
            output.extend_from_slice(&session.feed(piece, false, FlushMode::Auto)?);
        }
        output.extend_from_slice(&session.finish()?);
        Ok(output)
    }
}

/// Drive stream adaptors to completion.
pub mod stream {
    use super::*;

    pub fn to_vec(stream: impl Stream<Item = io::Result<Bytes>>) -> io::Result<Vec<u8>> {
        let stream = Box::pin(stream);
        let mut output = Vec::new();
        for chunk in block_on_stream(stream) {
            output.extend_from_slice(&chunk?);
        }
        Ok(output)
    }

    /// Every item the adaptor yields, errors included.
    pub fn items(stream: impl Stream<Item = io::Result<Bytes>>) -> Vec<io::Result<Bytes>> {
        block_on_stream(Box::pin(stream)).collect()
    }

    pub fn compress(format: Format, input: impl Stream<Item = io::Result<Bytes>>) -> Vec<u8> {
        to_vec(CompressionStream::new(input, format)).unwrap()
    }

    pub fn decompress(format: Format, input: impl Stream<Item = io::Result<Bytes>>) -> io::Result<Vec<u8>> {
        to_vec(DecompressionStream::new(input, format))
    }
}
