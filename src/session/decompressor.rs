use crate::{
    codec::{Engine, EngineRegistry, Flush, Inflate, Status, Z_BUF_ERROR},
    error::{Error, Result},
    pool::{BufferPool, Chunk, PooledBuf},
    session::{pull::PullDecoder, Session, DEFAULT_CAPACITY, DEFAULT_PULL_THRESHOLD},
    Direction, FlushMode, Format,
};
use std::sync::Arc;

/// Settings of a [`Decompressor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecompressorConfig {
    expected_checksum: Option<u32>,
    compute_checksum: bool,
    input_capacity: usize,
    output_capacity: usize,
    pull_threshold: usize,
}

impl Default for DecompressorConfig {
    fn default() -> Self {
        Self {
            expected_checksum: None,
            compute_checksum: false,
            input_capacity: DEFAULT_CAPACITY,
            output_capacity: DEFAULT_CAPACITY,
            pull_threshold: DEFAULT_PULL_THRESHOLD,
        }
    }
}

impl DecompressorConfig {
    /// The default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// CRC-32 the decompressed output must have; checked when the session finishes.
    ///
    /// Implies [`compute_checksum`](Self::compute_checksum). Only honored for the headerless
    /// formats.
    pub fn expected_checksum(mut self, crc: u32) -> Self {
        self.expected_checksum = Some(crc);
        self
    }

    /// Track a CRC-32 of the output without verifying it. Only honored for the headerless formats.
    pub fn compute_checksum(mut self, enabled: bool) -> Self {
        self.compute_checksum = enabled;
        self
    }

    /// Largest slice of input offered to the engine in one call.
    pub fn input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity.max(1);
        self
    }

    /// Size of the engine's output buffer.
    pub fn output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity.max(1);
        self
    }

    /// Buffered input after which the deflate64 decoder starts before the stream is finished.
    pub fn pull_threshold(mut self, threshold: usize) -> Self {
        self.pull_threshold = threshold;
        self
    }

    fn tracks_checksum(&self) -> bool {
        self.expected_checksum.is_some() || self.compute_checksum
    }
}

#[derive(Debug)]
enum Inner {
    Step {
        handle: Box<dyn Inflate>,
        output: PooledBuf,
        stream_ended: bool,
    },
    Pull(PullDecoder),
}

/// A decompression session.
#[derive(Debug)]
pub struct Decompressor {
    format: Format,
    config: DecompressorConfig,
    engine: Arc<dyn Engine>,
    pool: Arc<BufferPool>,
    inner: Option<Inner>,
    checksum: Option<u32>,
    initialized: bool,
    finished: bool,
    closed: bool,
}

impl Decompressor {
    /// A session using the shared engine and buffer pool.
    pub fn new(format: Format, config: DecompressorConfig) -> Self {
        Self::with_engine(format, config, EngineRegistry::global(), BufferPool::global())
    }

    /// A session using the given engine and buffer pool.
    pub fn with_engine(
        format: Format,
        config: DecompressorConfig,
        engine: Arc<dyn Engine>,
        pool: Arc<BufferPool>,
    ) -> Self {
        Self {
            format,
            config,
            engine,
            pool,
            inner: None,
            checksum: None,
            initialized: false,
            finished: false,
            closed: false,
        }
    }

    /// The session's format.
    pub fn format(&self) -> Format {
        self.format
    }

    fn verify(&self) -> Result<()> {
        match (self.config.expected_checksum, self.checksum) {
            (Some(expected), Some(actual)) if expected != actual => {
                Err(Error::ChecksumMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// Run `data` through a step engine, offering at most `capacity` bytes per call.
///
/// The loop keeps calling while input remains or the output buffer came back full. When
/// finishing it also keeps going until the stream ends, failing once the engine stops making
/// progress.
#[allow(clippy::too_many_arguments)]
fn inflate_steps(
    handle: &mut dyn Inflate,
    output: &mut [u8],
    stream_ended: &mut bool,
    data: &[u8],
    capacity: usize,
    finish: bool,
    flush: Flush,
    sink: &mut dyn FnMut(&[u8]),
) -> Result<()> {
    if *stream_ended {
        if !data.is_empty() {
            tracing::debug!(len = data.len(), "ignoring input after end of stream");
        }
        return Ok(());
    }

    let mut processed = 0;
    loop {
        let remaining = &data[processed..];
        let slice = &remaining[..remaining.len().min(capacity)];
        let flush = if finish && slice.len() == remaining.len() {
            Flush::Finish
        } else {
            flush
        };

        let step = handle.step(slice, output, flush);
        processed += step.consumed;
        if step.produced > 0 {
            sink(&output[..step.produced]);
        }

        match step.status {
            Status::StreamEnd => {
                *stream_ended = true;
                if processed < data.len() {
                    tracing::debug!(
                        len = data.len() - processed,
                        "ignoring trailing input after end of stream"
                    );
                }
                return Ok(());
            }
            Status::Ok | Status::BufError => {}
            Status::Failed(code) => return Err(Error::DecompressionFailed { code }),
        }

        if step.produced == output.len() {
            continue;
        }

        let exhausted = processed == data.len();
        if exhausted && !finish {
            return Ok(());
        }

        if !step.progressed() {
            return Err(Error::DecompressionFailed { code: Z_BUF_ERROR });
        }
    }
}

impl Session for Decompressor {
    fn initialize(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if self.initialized {
            return Ok(());
        }

        let inner = if self.format.is_pull() {
            let handle = self.engine.inflate_back(self.format)?;
            Inner::Pull(PullDecoder::new(handle, self.config.pull_threshold))
        } else {
            Inner::Step {
                handle: self.engine.inflate(self.format)?,
                output: self.pool.get(self.config.output_capacity),
                stream_ended: false,
            }
        };

        self.inner = Some(inner);
        self.checksum = if self.format.is_raw() && self.config.tracks_checksum() {
            Some(0)
        } else {
            None
        };
        self.initialized = true;

        tracing::debug!(format = %self.format, "decompression session initialized");
        Ok(())
    }

    fn feed(&mut self, data: &[u8], finish: bool, flush: FlushMode) -> Result<Chunk> {
        if self.finished {
            return Ok(Chunk::empty());
        }
        self.initialize()?;

        let finish = finish || flush == FlushMode::Finish;
        tracing::trace!(len = data.len(), finish, "decompression feed");

        if data.is_empty() && !finish {
            return Ok(Chunk::empty());
        }

        let Self {
            config,
            engine,
            pool,
            inner,
            checksum,
            ..
        } = &mut *self;

        let mut pieces = Vec::new();
        let mut sink = |produced: &[u8]| {
            if let Some(crc) = checksum.as_mut() {
                *crc = engine.crc32(*crc, produced);
            }
            pieces.push(Chunk::copy_from(pool, produced));
        };

        match inner {
            Some(Inner::Step {
                handle,
                output,
                stream_ended,
            }) => inflate_steps(
                &mut **handle,
                output,
                stream_ended,
                data,
                config.input_capacity,
                finish,
                flush.resolve(Direction::Decompress),
                &mut sink,
            )?,
            Some(Inner::Pull(decoder)) => decoder.feed(data, finish, &mut sink)?,
            None => return Err(Error::Closed),
        }

        if finish {
            self.finished = true;
        }
        Ok(Chunk::concat(&self.pool, pieces))
    }

    fn finish(&mut self) -> Result<Chunk> {
        let result = self.feed(&[], true, FlushMode::Finish);
        self.cleanup();
        let chunk = result?;
        self.verify()?;
        Ok(chunk)
    }

    fn cleanup(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!(format = %self.format, "decompression session released");
        }
        self.closed = true;
    }

    fn checksum(&self) -> Option<u32> {
        self.checksum
    }
}

impl Drop for Decompressor {
    fn drop(&mut self) {
        self.cleanup();
    }
}
