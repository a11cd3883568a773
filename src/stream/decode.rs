use std::io::Write;

use crate::codec::metadata::{FileDescriptor, decode_metadata};
use crate::codec::payload::PayloadReassembler;
use crate::foundation::core::Resolution;
use crate::foundation::error::{ReelError, ReelResult};
use crate::stream::StreamState;
use crate::transport::source::FrameSource;

/// Counts for one reassembled payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Payload frames consumed (excludes the metadata frame).
    pub payload_frames: u64,
    /// Bytes written to the output.
    pub bytes: u64,
}

/// Pull-driven decode stream over a [`FrameSource`].
///
/// The metadata frame is consumed first to learn the file size; then exactly
/// `ceil(file_size / bytes_per_frame)` payload frames are pulled. Frames beyond that bound are
/// never requested from the source.
pub struct DecodeStream<S> {
    source: S,
    res: Resolution,
    state: StreamState,
    desc: Option<FileDescriptor>,
}

impl<S: FrameSource> DecodeStream<S> {
    pub fn new(source: S, res: Resolution) -> Self {
        Self {
            source,
            res,
            state: StreamState::Start,
            desc: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Consume the metadata frame (once) and return the recovered descriptor.
    pub fn read_descriptor(&mut self) -> ReelResult<FileDescriptor> {
        if let Some(desc) = &self.desc {
            return Ok(desc.clone());
        }
        if self.state != StreamState::Start {
            return Err(ReelError::validation("decode stream already failed"));
        }

        let Some(frame) = self.source.next_frame()? else {
            self.state = StreamState::Done;
            return Err(ReelError::TruncatedStream {
                expected: self.res.frame_len() as u64,
                got: 0,
            });
        };
        let desc = match decode_metadata(&frame, self.res) {
            Ok(desc) => desc,
            Err(e) => {
                self.state = StreamState::Done;
                return Err(e);
            }
        };
        tracing::debug!(
            file_size = desc.file_size,
            extension = %desc.extension,
            payload_frames = desc.payload_frames(self.res),
            "metadata frame decoded"
        );
        self.state = StreamState::Metadata;
        self.desc = Some(desc.clone());
        Ok(desc)
    }

    /// Reassemble the payload into `out`.
    ///
    /// Fails with [`ReelError::TruncatedStream`] when the source ends early; whatever was already
    /// written to `out` must then be discarded by the caller.
    pub fn write_payload<W: Write>(&mut self, out: W) -> ReelResult<(W, DecodeStats)> {
        let desc = self.read_descriptor()?;
        if self.state != StreamState::Metadata {
            return Err(ReelError::validation("payload already consumed"));
        }

        let total = desc.payload_frames(self.res);
        let mut re = PayloadReassembler::new(out, self.res, desc.file_size);
        let mut consumed = 0u64;
        while consumed < total {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    self.state = StreamState::Done;
                    return Err(e);
                }
            };
            if let Err(e) = re.push(&frame) {
                self.state = StreamState::Done;
                return Err(e);
            }
            consumed += 1;
            self.state = StreamState::Payload(consumed);
            tracing::trace!(idx = consumed, "payload frame");
        }
        self.state = StreamState::Done;
        if consumed == total {
            tracing::debug!(
                payload_frames = total,
                "payload complete, not reading further frames"
            );
        }

        let bytes = re.written();
        let out = re.finish()?;
        Ok((
            out,
            DecodeStats {
                payload_frames: consumed,
                bytes,
            },
        ))
    }

    /// Give the source back, e.g. to `finish` it.
    pub fn into_source(self) -> S {
        self.source
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/decode.rs"]
mod tests;
