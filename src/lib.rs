//! Bytereel stores arbitrary files as lossless raster video and recovers them byte-for-byte.
//!
//! A file becomes a metadata frame (size and extension) followed by payload frames, each carrying
//! `width * height` file bytes replicated into R, G and B. Frames stream through a [`FrameSink`]
//! (system `ffmpeg` with a lossless codec, or memory) and come back through a [`FrameSource`].
//!
//! - Encode: [`encode_file`] / [`EncodeStream`]
//! - Decode: [`decode_to_file`] / [`DecodeStream`]
#![forbid(unsafe_code)]

mod foundation;

/// Metadata and payload codecs.
pub mod codec;
/// RGB24 frame buffer.
pub mod frame;
/// Output path helpers.
pub mod output;
/// Encode/decode sessions.
pub mod session;
/// Encode and decode frame streams.
pub mod stream;
/// Video transport (sinks and sources).
pub mod transport;

pub use crate::foundation::core::{Fps, FrameIndex, Resolution};
pub use crate::foundation::error::{MetadataRow, ReelError, ReelResult};

pub use crate::codec::metadata::{FileDescriptor, decode_metadata, encode_metadata};
pub use crate::codec::payload::{PayloadChunker, PayloadReassembler};
pub use crate::frame::FrameRgb;
pub use crate::session::{
    DecodeOpts, DecodeTarget, DecodedFile, EncodeOpts, EncodeStats, decode_to_file, decode_to_vec,
    encode_file, encode_reader, read_descriptor,
};
pub use crate::stream::StreamState;
pub use crate::stream::decode::{DecodeStats, DecodeStream};
pub use crate::stream::encode::EncodeStream;
pub use crate::transport::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, FfmpegSource, FfmpegSourceOpts, LosslessCodec, is_ffmpeg_on_path,
    is_ffprobe_on_path, probe_resolution,
};
pub use crate::transport::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::transport::source::{FrameSource, InMemorySource};
