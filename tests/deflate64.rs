mod utils;

use flate_session::{
    session::{Decompressor, DecompressorConfig, Session},
    Error, FlushMode, Format,
};
use utils::{random_bytes, sync, text, InputStream};

const FORMATS: [Format; 2] = [Format::Deflate64, Format::Deflate64Raw];

#[test]
#[ntest::timeout(5000)]
fn all_at_once() {
    let input = text(200_000);
    let compressed = sync::stored(&input);

    for format in FORMATS.iter().copied() {
        let output = utils::session::decompress(format, DecompressorConfig::new(), &compressed, usize::MAX)
            .unwrap();
        assert_eq!(output, input);
    }
}

/// A fixed-Huffman deflate64 block: ten literals, a 39990 byte match through length code 285
/// with its 16 extra bits, then a 7 byte match at distance 33333 through distance code 30.
const LONG_MATCHES: &[u8] =
    b"\x33\x30\x34\x32\x36\x31\x35\x33\xb7\xb0\x1c\x9d\xe1\x64\x41\x1f\x8d\x00\x00";

fn long_matches_output() -> Vec<u8> {
    let mut expected = b"0123456789".repeat(4000);
    expected.extend_from_slice(b"7890123");
    expected
}

#[test]
#[ntest::timeout(5000)]
fn long_length_and_far_distance() {
    let expected = long_matches_output();

    for format in FORMATS.iter().copied() {
        for write_size in [1, 5, usize::MAX].iter().copied() {
            let output = utils::session::decompress(
                format,
                DecompressorConfig::new(),
                LONG_MATCHES,
                write_size,
            )
            .unwrap();
            assert_eq!(output.len(), expected.len(), "{} in writes of {}", format, write_size);
            assert_eq!(output, expected, "{} in writes of {}", format, write_size);
        }
    }

    let output = utils::stream::decompress(
        Format::Deflate64Raw,
        InputStream::chunked(LONG_MATCHES, 3).stream(),
    )
    .unwrap();
    assert_eq!(output, expected);
}

#[test]
#[ntest::timeout(5000)]
fn small_writes() {
    let input = random_bytes(100_000);
    let compressed = sync::stored(&input);

    for write_size in [1, 128, 4096].iter().copied() {
        let output =
            utils::session::decompress(Format::Deflate64, DecompressorConfig::new(), &compressed, write_size)
                .unwrap();
        assert_eq!(output, input);
    }
}

#[test]
#[ntest::timeout(5000)]
fn drains_before_finish_past_threshold() {
    let input = text(50_000);
    let compressed = sync::stored(&input);
    let config = DecompressorConfig::new().pull_threshold(1024);

    let mut session = Decompressor::new(Format::Deflate64, config);
    let mut output = Vec::new();
    for piece in compressed.chunks(512) {
        output.extend_from_slice(&session.feed(piece, false, FlushMode::Auto).unwrap());
    }
    // Everything arrived before the finish.
    assert_eq!(output, input);
    assert!(session.finish().unwrap().is_empty());
}

#[test]
#[ntest::timeout(5000)]
fn accumulates_until_finish_below_threshold() {
    let input = text(1000);
    let compressed = sync::stored(&input);

    let mut session = Decompressor::new(Format::Deflate64, DecompressorConfig::new());
    assert!(session
        .feed(&compressed, false, FlushMode::Auto)
        .unwrap()
        .is_empty());
    assert_eq!(&*session.finish().unwrap(), &input[..]);
}

#[test]
#[ntest::timeout(5000)]
fn truncated_is_incomplete() {
    let compressed = sync::stored(&text(5000));
    let err = utils::session::decompress(
        Format::Deflate64,
        DecompressorConfig::new(),
        &compressed[..compressed.len() - 10],
        700,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Deflate64Incomplete { code: -5 }));
    assert_eq!(
        std::io::Error::from(err).kind(),
        std::io::ErrorKind::UnexpectedEof
    );
}

#[test]
#[ntest::timeout(5000)]
fn corrupt_is_failed() {
    let err = utils::session::decompress(
        Format::Deflate64,
        DecompressorConfig::new(),
        &[0xff; 64],
        64,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Deflate64Failed { .. }));
}

#[test]
#[ntest::timeout(5000)]
fn complete_session_ignores_more_input() {
    let compressed = sync::stored(b"done");
    let mut session = Decompressor::new(Format::Deflate64, DecompressorConfig::new());
    assert_eq!(&*session.feed(&compressed, true, FlushMode::Auto).unwrap(), b"done");
    assert!(session
        .feed(b"anything", false, FlushMode::Auto)
        .unwrap()
        .is_empty());
}

#[test]
#[ntest::timeout(5000)]
fn raw_checksum() {
    let input = text(30_000);
    let compressed = sync::stored(&input);
    let crc = crc32fast::hash(&input);

    let config = DecompressorConfig::new().expected_checksum(crc);
    let output = utils::session::decompress(Format::Deflate64Raw, config, &compressed, 1000).unwrap();
    assert_eq!(output, input);

    let config = DecompressorConfig::new().expected_checksum(crc ^ 0xffff_ffff);
    let err = utils::session::decompress(Format::Deflate64Raw, config, &compressed, 1000).unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }));

    // The framed variant never tracks a checksum.
    let config = DecompressorConfig::new().expected_checksum(crc ^ 0xffff_ffff);
    utils::session::decompress(Format::Deflate64, config, &compressed, 1000).unwrap();
}

#[test]
#[ntest::timeout(5000)]
fn stream_adaptor() {
    let input = random_bytes(70_000);
    let compressed = sync::stored(&input);
    let stream = InputStream::chunked(&compressed, 3000);

    let output = utils::stream::decompress(Format::Deflate64, stream.stream()).unwrap();
    assert_eq!(output, input);
}
