use std::collections::VecDeque;

use crate::foundation::error::ReelResult;
use crate::frame::FrameRgb;

/// Source contract for decode sessions.
///
/// Yields frames in the order they were written, then `Ok(None)` at end of stream. A consumer may
/// stop pulling before the end; `finish` then releases the transport.
pub trait FrameSource {
    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> ReelResult<Option<FrameRgb>>;

    /// Release the transport and report any failure it recorded.
    fn finish(&mut self) -> ReelResult<()> {
        Ok(())
    }
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    fn next_frame(&mut self) -> ReelResult<Option<FrameRgb>> {
        (**self).next_frame()
    }

    fn finish(&mut self) -> ReelResult<()> {
        (**self).finish()
    }
}

/// In-memory source for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySource {
    frames: VecDeque<FrameRgb>,
    pulled: usize,
}

impl InMemorySource {
    pub fn new(frames: impl IntoIterator<Item = FrameRgb>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            pulled: 0,
        }
    }

    /// Frames handed out so far.
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    /// Frames not yet pulled.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for InMemorySource {
    fn next_frame(&mut self) -> ReelResult<Option<FrameRgb>> {
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.pulled += 1;
        }
        Ok(frame)
    }
}
