use crate::{
    codec::{InflateBack, PullStatus},
    error::{Error, Result},
};
use std::mem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Gathering input, the engine has not run yet.
    Accumulating,
    /// The engine has run at least once; every feed runs it again.
    Draining,
    Complete,
}

/// Drives a callback-driven engine from push-style feeds.
///
/// Input is buffered until the stream is finished or the buffer reaches `threshold` bytes, then
/// the whole buffer is offered to the engine in one top-level call. After that every feed hands
/// the newly buffered bytes over until the engine reports the end of the stream.
#[derive(Debug)]
pub(crate) struct PullDecoder {
    handle: Box<dyn InflateBack>,
    state: State,
    buffered: Vec<u8>,
    threshold: usize,
}

impl PullDecoder {
    pub(crate) fn new(handle: Box<dyn InflateBack>, threshold: usize) -> Self {
        Self {
            handle,
            state: State::Accumulating,
            buffered: Vec::new(),
            threshold,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Buffer `data` and run the engine if it is due, passing decompressed bytes to `sink`.
    pub(crate) fn feed(
        &mut self,
        data: &[u8],
        finish: bool,
        sink: &mut dyn FnMut(&[u8]),
    ) -> Result<()> {
        if self.is_complete() {
            if !data.is_empty() {
                tracing::debug!(len = data.len(), "ignoring input after end of stream");
            }
            return Ok(());
        }

        self.buffered.extend_from_slice(data);

        if self.state == State::Accumulating {
            if !finish && self.buffered.len() < self.threshold {
                return Ok(());
            }
            tracing::debug!(
                buffered = self.buffered.len(),
                finish,
                "pull decoder draining"
            );
            self.state = State::Draining;
        }

        let mut buffered = mem::take(&mut self.buffered);
        let status = {
            let available: &[u8] = &buffered;
            let exhausted: &[u8] = &[];
            let mut supplied = false;
            self.handle.inflate_back(
                &mut || {
                    if supplied {
                        exhausted
                    } else {
                        supplied = true;
                        available
                    }
                },
                sink,
            )
        };

        match status {
            PullStatus::StreamEnd => {
                self.state = State::Complete;
                tracing::debug!("pull decoder complete");
                Ok(())
            }
            PullStatus::Failed(code) => Err(Error::Deflate64Failed { code }),
            PullStatus::InputExhausted if finish => {
                Err(Error::Deflate64Incomplete { code: status.code() })
            }
            PullStatus::InputExhausted => {
                // The engine took everything, keep the allocation for the next feed.
                buffered.clear();
                self.buffered = buffered;
                Ok(())
            }
        }
    }
}
