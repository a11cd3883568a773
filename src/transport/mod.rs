//! Video transport boundary.
//!
//! Encode sessions push frames into a [`sink::FrameSink`]; decode sessions pull them from a
//! [`source::FrameSource`]. The `ffmpeg` implementations talk to a child process over pipes, the
//! in-memory ones back the tests.

/// `ffmpeg`-based sink and source (system `ffmpeg`/`ffprobe`).
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
/// Frame source trait and the in-memory source.
pub mod source;
