use crate::{
    codec::{Deflate, Engine, EngineRegistry, Flush, Status, Z_BUF_ERROR},
    error::{Error, Result},
    pool::{BufferPool, Chunk, PooledBuf},
    session::{Session, DEFAULT_CAPACITY},
    Direction, FlushMode, Format, Level,
};
use std::sync::Arc;

/// Settings of a [`Compressor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressorConfig {
    level: Level,
    compute_checksum: bool,
    input_capacity: usize,
    output_capacity: usize,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            level: Level::Default,
            compute_checksum: false,
            input_capacity: DEFAULT_CAPACITY,
            output_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CompressorConfig {
    /// The default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compression level, [`Level::Default`] unless set.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Track a CRC-32 of the input. Only honored for the headerless formats, the framed ones carry
    /// their own checksum.
    pub fn compute_checksum(mut self, enabled: bool) -> Self {
        self.compute_checksum = enabled;
        self
    }

    /// Largest unit of input handed to the engine in one go.
    pub fn input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity.max(1);
        self
    }

    /// Size of the engine's output buffer.
    pub fn output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity.max(1);
        self
    }
}

/// A compression session.
#[derive(Debug)]
pub struct Compressor {
    format: Format,
    config: CompressorConfig,
    engine: Arc<dyn Engine>,
    pool: Arc<BufferPool>,
    handle: Option<Box<dyn Deflate>>,
    output: Option<PooledBuf>,
    checksum: Option<u32>,
    initialized: bool,
    finished: bool,
    closed: bool,
}

impl Compressor {
    /// A session using the shared engine and buffer pool.
    pub fn new(format: Format, config: CompressorConfig) -> Self {
        Self::with_engine(format, config, EngineRegistry::global(), BufferPool::global())
    }

    /// A session using the given engine and buffer pool.
    pub fn with_engine(
        format: Format,
        config: CompressorConfig,
        engine: Arc<dyn Engine>,
        pool: Arc<BufferPool>,
    ) -> Self {
        Self {
            format,
            config,
            engine,
            pool,
            handle: None,
            output: None,
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

    fn is_identity(&self) -> bool {
        self.format == Format::RawDeflate && self.config.level.is_identity()
    }

    fn compress_unit(
        &mut self,
        unit: &[u8],
        finish: bool,
        flush: FlushMode,
        pieces: &mut Vec<Chunk>,
    ) -> Result<()> {
        if unit.len() > self.config.input_capacity {
            return Err(Error::ChunkSizeExceeded {
                len: unit.len(),
                capacity: self.config.input_capacity,
            });
        }

        if let Some(crc) = self.checksum.as_mut() {
            *crc = self.engine.crc32(*crc, unit);
        }

        if self.is_identity() {
            pieces.push(Chunk::copy_from(&self.pool, unit));
            return Ok(());
        }

        let (handle, output) = match (self.handle.as_mut(), self.output.as_mut()) {
            (Some(handle), Some(output)) => (handle, output),
            _ => return Err(Error::Closed),
        };

        // Only the last unit of a finishing feed may terminate the stream.
        let flush = match flush.resolve(Direction::Compress) {
            _ if finish => Flush::Finish,
            Flush::Finish => Flush::None,
            flush => flush,
        };

        let mut input = unit;
        loop {
            let step = handle.step(input, output, flush);
            input = &input[step.consumed..];
            if step.produced > 0 {
                pieces.push(Chunk::copy_from(&self.pool, &output[..step.produced]));
            }

            match step.status {
                Status::StreamEnd if finish => return Ok(()),
                Status::Ok | Status::BufError => {}
                other => return Err(Error::CompressionFailed { code: other.code() }),
            }

            // A full output buffer may hide more pending output.
            let drained = step.produced < output.len();

            if !finish && input.is_empty() && drained {
                return Ok(());
            }

            if !step.progressed() {
                return Err(Error::CompressionFailed { code: Z_BUF_ERROR });
            }
        }
    }
}

impl Session for Compressor {
    fn initialize(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if self.initialized {
            return Ok(());
        }

        if !self.is_identity() {
            self.handle = Some(self.engine.deflate(self.format, self.config.level)?);
            self.output = Some(self.pool.get(self.config.output_capacity));
        }

        self.checksum = if self.format.is_raw() && self.config.compute_checksum {
            Some(0)
        } else {
            None
        };
        self.initialized = true;

        tracing::debug!(
            format = %self.format,
            level = ?self.config.level,
            identity = self.is_identity(),
            "compression session initialized"
        );
        Ok(())
    }

    fn feed(&mut self, data: &[u8], finish: bool, flush: FlushMode) -> Result<Chunk> {
        if self.finished {
            return Ok(Chunk::empty());
        }
        self.initialize()?;

        let finish = finish || flush == FlushMode::Finish;
        tracing::trace!(len = data.len(), finish, "compression feed");

        if data.is_empty() && !finish {
            return Ok(Chunk::empty());
        }

        let mut pieces = Vec::new();
        if data.is_empty() {
            self.compress_unit(&[], true, flush, &mut pieces)?;
        } else {
            let mut units = data.chunks(self.config.input_capacity).peekable();
            while let Some(unit) = units.next() {
                let last = units.peek().is_none();
                self.compress_unit(unit, finish && last, flush, &mut pieces)?;
            }
        }

        if finish {
            self.finished = true;
        }
        Ok(Chunk::concat(&self.pool, pieces))
    }

    fn finish(&mut self) -> Result<Chunk> {
        let result = self.feed(&[], true, FlushMode::Finish);
        self.cleanup();
        result
    }

    fn cleanup(&mut self) {
        let released = self.handle.take().is_some() | self.output.take().is_some();
        if released {
            tracing::debug!(format = %self.format, "compression session released");
        }
        self.closed = true;
    }

    fn checksum(&self) -> Option<u32> {
        self.checksum
    }
}

impl Drop for Compressor {
    fn drop(&mut self) {
        self.cleanup();
    }
}
