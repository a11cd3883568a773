use crate::foundation::core::{Fps, FrameIndex, Resolution};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::FrameRgb;
use crate::transport::source::InMemorySource;

/// Configuration provided to a [`FrameSink`] at the start of an encode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame size in pixels.
    pub resolution: Resolution,
    /// Output frames-per-second (transport only, framing ignores it).
    pub fps: Fps,
}

/// Sink contract for consuming encoded frames in order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, starting
/// with the metadata frame at index 0. Every frame is exactly `width * height * 3` bytes.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames in push order.
    pub(crate) frames: Vec<(FrameIndex, FrameRgb)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Replay the captured frames, as a lossless transport would.
    pub fn into_source(self) -> InMemorySource {
        InMemorySource::new(self.frames.into_iter().map(|(_, f)| f))
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ReelResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ReelError::validation("in-memory sink not started"))?;
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(ReelError::validation(
                "in-memory sink received out-of-order frame index",
            ));
        }
        frame.check_shape(cfg.resolution)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/sink.rs"]
mod tests;
