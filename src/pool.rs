//! Reusable byte buffers shared by every session.
//!
//! Sessions produce output in many small, similarly sized pieces. The [`BufferPool`] keeps a short
//! LIFO free-list per exact buffer length so those pieces do not each cost an allocation. Buffers
//! are handed out as [`PooledBuf`] guards which put themselves back when dropped.

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    fmt, mem,
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, MutexGuard},
};

/// Free-list depth per buffer length.
pub const DEFAULT_DEPTH: usize = 8;

static GLOBAL: Lazy<Arc<BufferPool>> = Lazy::new(|| Arc::new(BufferPool::new()));

/// A cache of byte buffers keyed by their exact length.
pub struct BufferPool {
    pools: Mutex<HashMap<usize, Vec<Box<[u8]>>>>,
    max_depth: usize,
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pools = self.lock();
        let mut sizes: Vec<_> = pools.keys().copied().collect();
        sizes.sort_unstable();
        f.debug_struct("BufferPool")
            .field("sizes", &sizes)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    /// An empty pool keeping up to [`DEFAULT_DEPTH`] buffers per length.
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }

    /// An empty pool keeping up to `max_depth` buffers per length.
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
            max_depth,
        }
    }

    /// The process-wide pool.
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<usize, Vec<Box<[u8]>>>> {
        // The map is never left half-updated, a panic elsewhere does not invalidate it.
        self.pools
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A buffer of exactly `size` bytes. Its contents are unspecified.
    pub fn get(self: &Arc<Self>, size: usize) -> PooledBuf {
        let recycled = if size == 0 {
            None
        } else {
            self.lock().get_mut(&size).and_then(Vec::pop)
        };

        PooledBuf {
            buf: recycled.unwrap_or_else(|| vec![0; size].into_boxed_slice()),
            pool: self.clone(),
        }
    }

    /// Return `buf` to the free-list for its length, dropping it if that list is full.
    pub fn release(&self, buf: Box<[u8]>) {
        if buf.is_empty() {
            return;
        }

        let mut pools = self.lock();
        let pool = pools.entry(buf.len()).or_default();
        if pool.len() < self.max_depth {
            pool.push(buf);
        }
    }

    /// Drop every cached buffer.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached buffers of length `size`.
    pub fn depth(&self, size: usize) -> usize {
        self.lock().get(&size).map_or(0, Vec::len)
    }
}

/// A buffer borrowed from a [`BufferPool`], returned to it on drop.
pub struct PooledBuf {
    buf: Box<[u8]>,
    pool: Arc<BufferPool>,
}

impl fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuf")
            .field("len", &self.buf.len())
            .finish()
    }
}

impl Deref for PooledBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}

/// Output of a single `feed`: a prefix of a pooled buffer.
///
/// Dropping the chunk hands its buffer back to the pool; copy the bytes out to keep them longer.
#[derive(Debug, Default)]
pub struct Chunk {
    buf: Option<PooledBuf>,
    len: usize,
}

impl Chunk {
    /// A chunk holding no bytes and no buffer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy `data` into a buffer taken from `pool`.
    pub fn copy_from(pool: &Arc<BufferPool>, data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::empty();
        }

        let mut buf = pool.get(data.len());
        buf.copy_from_slice(data);
        Self {
            buf: Some(buf),
            len: data.len(),
        }
    }

    /// Join `chunks` in order into one chunk.
    pub fn concat(pool: &Arc<BufferPool>, chunks: Vec<Chunk>) -> Self {
        let mut chunks: Vec<_> = chunks.into_iter().filter(|chunk| !chunk.is_empty()).collect();

        match chunks.len() {
            0 => Self::empty(),
            1 => chunks.remove(0),
            _ => {
                let total = chunks.iter().map(Chunk::len).sum();
                let mut buf = pool.get(total);
                let mut offset = 0;
                for chunk in &chunks {
                    buf[offset..offset + chunk.len()].copy_from_slice(chunk);
                    offset += chunk.len();
                }
                Self {
                    buf: Some(buf),
                    len: total,
                }
            }
        }
    }

    /// Number of bytes in the chunk.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the chunk holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.buf {
            Some(buf) => &buf[..self.len],
            None => &[],
        }
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        self
    }
}
