use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Context as _;

use crate::codec::metadata::{FileDescriptor, encode_metadata};
use crate::codec::payload::PayloadChunker;
use crate::foundation::core::{FrameIndex, Resolution};
use crate::foundation::error::ReelResult;
use crate::frame::FrameRgb;
use crate::output::file_extension;
use crate::stream::StreamState;

/// Pull-based encode stream: the metadata frame, then one payload frame per window of input.
///
/// The metadata frame is built (and checked for overflow) when the stream is created, so a
/// descriptor that does not fit the resolution fails before any frame exists. Payload frames are
/// read from the input only when requested. Finite and not restartable.
pub struct EncodeStream<R> {
    res: Resolution,
    desc: FileDescriptor,
    metadata: Option<FrameRgb>,
    chunker: PayloadChunker<R>,
    state: StreamState,
}

impl EncodeStream<BufReader<File>> {
    /// Open `path` for encoding at `res`.
    ///
    /// The size is captured now; the file handle is owned by the stream until it is dropped.
    pub fn open(path: &Path, res: Resolution) -> ReelResult<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open input '{}'", path.display()))?;
        let file_size = file
            .metadata()
            .with_context(|| format!("failed to stat input '{}'", path.display()))?
            .len();
        let desc = FileDescriptor::new(file_size, file_extension(path));
        Self::new(BufReader::new(file), desc, res)
    }
}

impl<R: Read> EncodeStream<R> {
    /// Encode `desc.file_size` bytes from `reader`.
    pub fn new(reader: R, desc: FileDescriptor, res: Resolution) -> ReelResult<Self> {
        let metadata = encode_metadata(&desc, res)?;
        Ok(Self {
            res,
            chunker: PayloadChunker::new(reader, res, desc.file_size),
            desc,
            metadata: Some(metadata),
            state: StreamState::Start,
        })
    }

    pub fn descriptor(&self) -> &FileDescriptor {
        &self.desc
    }

    pub fn resolution(&self) -> Resolution {
        self.res
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Total frames this stream yields: the metadata frame plus `ceil(size / bytes_per_frame)`.
    pub fn total_frames(&self) -> u64 {
        1 + self.desc.payload_frames(self.res)
    }

    /// Produce the next frame with its index, or `None` once the stream is done.
    pub fn next_frame(&mut self) -> ReelResult<Option<(FrameIndex, FrameRgb)>> {
        match self.state {
            StreamState::Done => Ok(None),
            StreamState::Start => {
                self.state = StreamState::Metadata;
                // Built in `new`, taken exactly once here.
                Ok(self.metadata.take().map(|f| (FrameIndex(0), f)))
            }
            StreamState::Metadata | StreamState::Payload(_) => {
                let idx = match self.state {
                    StreamState::Payload(i) => i + 1,
                    _ => 1,
                };
                match self.chunker.next_frame() {
                    Ok(Some(frame)) => {
                        tracing::trace!(idx, "payload frame");
                        self.state = StreamState::Payload(idx);
                        Ok(Some((FrameIndex(idx), frame)))
                    }
                    Ok(None) => {
                        self.state = StreamState::Done;
                        Ok(None)
                    }
                    Err(e) => {
                        self.state = StreamState::Done;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Payload bytes read so far (without padding).
    pub fn payload_bytes(&self) -> u64 {
        self.chunker.consumed()
    }
}

impl<R: Read> Iterator for EncodeStream<R> {
    type Item = ReelResult<(FrameIndex, FrameRgb)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/encode.rs"]
mod tests;
