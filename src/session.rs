//! Encode and decode sessions.
//!
//! A session owns its input for its whole lifetime and is all-or-nothing: it either completes
//! with a byte-exact result or fails, and nothing is retried.

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::codec::metadata::FileDescriptor;
use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{ReelError, ReelResult};
use crate::output::{decoded_path, partial_path};
use crate::stream::decode::{DecodeStats, DecodeStream};
use crate::stream::encode::EncodeStream;
use crate::transport::ffmpeg::ensure_parent_dir;
use crate::transport::sink::{FrameSink, SinkConfig};
use crate::transport::source::FrameSource;

const PREALLOC_LIMIT: u64 = 64 * 1024 * 1024;

/// Options for an encode session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOpts {
    /// Frame size.
    pub resolution: Resolution,
    /// Frame rate handed to the sink.
    pub fps: Fps,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            fps: Fps::default(),
        }
    }
}

impl EncodeOpts {
    pub fn validate(&self) -> ReelResult<()> {
        Resolution::new(self.resolution.width, self.resolution.height)?;
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }
}

/// Encode session statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Frames pushed, including the metadata frame.
    pub frames: u64,
    /// File bytes carried by payload frames.
    pub payload_bytes: u64,
    /// Zero bytes appended to the final payload frame.
    pub padding_bytes: u64,
}

/// Encode the file at `input` into `sink`.
#[tracing::instrument(skip(sink, input), fields(input = %input.display()))]
pub fn encode_file(
    input: &Path,
    sink: &mut dyn FrameSink,
    opts: &EncodeOpts,
) -> ReelResult<EncodeStats> {
    opts.validate()?;
    let stream = EncodeStream::open(input, opts.resolution)?;
    run_encode(stream, sink, opts)
}

/// Encode `desc.file_size` bytes from `reader` into `sink`.
pub fn encode_reader<R: Read>(
    reader: R,
    desc: FileDescriptor,
    sink: &mut dyn FrameSink,
    opts: &EncodeOpts,
) -> ReelResult<EncodeStats> {
    opts.validate()?;
    let stream = EncodeStream::new(reader, desc, opts.resolution)?;
    run_encode(stream, sink, opts)
}

fn run_encode<R: Read>(
    mut stream: EncodeStream<R>,
    sink: &mut dyn FrameSink,
    opts: &EncodeOpts,
) -> ReelResult<EncodeStats> {
    tracing::debug!(
        file_size = stream.descriptor().file_size,
        extension = %stream.descriptor().extension,
        frames = stream.total_frames(),
        resolution = %opts.resolution,
        "encode session start"
    );

    sink.begin(SinkConfig {
        resolution: opts.resolution,
        fps: opts.fps,
    })?;

    let mut frames = 0u64;
    while let Some((idx, frame)) = stream.next_frame()? {
        sink.push_frame(idx, &frame)?;
        frames += 1;
    }
    sink.end()?;

    let payload_bytes = stream.payload_bytes();
    let stats = EncodeStats {
        frames,
        payload_bytes,
        padding_bytes: (frames - 1) * opts.resolution.bytes_per_frame() as u64 - payload_bytes,
    };
    tracing::info!(
        frames = stats.frames,
        payload_bytes = stats.payload_bytes,
        padding_bytes = stats.padding_bytes,
        "encode session complete"
    );
    Ok(stats)
}

/// Options for a decode session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOpts {
    /// Frame size of the encoded video.
    pub resolution: Resolution,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl DecodeOpts {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            overwrite: true,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        Resolution::new(self.resolution.width, self.resolution.height)?;
        if self.resolution.height < 2 {
            return Err(ReelError::invalid_resolution(format!(
                "{}: the metadata frame needs at least two rows",
                self.resolution
            )));
        }
        Ok(())
    }
}

/// Where a decode writes the recovered file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeTarget {
    /// Exactly this path.
    File(PathBuf),
    /// `<dir>/<stem>.<recovered extension>`.
    Dir {
        /// Output directory.
        dir: PathBuf,
        /// File name without extension.
        stem: String,
    },
}

/// Result of [`decode_to_file`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFile {
    /// Final output path.
    pub path: PathBuf,
    /// Descriptor recovered from the metadata frame.
    pub descriptor: FileDescriptor,
    /// Payload counts.
    pub stats: DecodeStats,
}

/// Decode the frames of `source` into a file.
///
/// Bytes go to a `.partial` sibling first and are renamed into place only after the whole payload
/// was recovered, so a failed session leaves no output behind.
#[tracing::instrument(skip(source))]
pub fn decode_to_file(
    source: &mut dyn FrameSource,
    target: &DecodeTarget,
    opts: &DecodeOpts,
) -> ReelResult<DecodedFile> {
    opts.validate()?;
    let res = opts.resolution;
    let mut stream = DecodeStream::new(&mut *source, res);
    let descriptor = stream.read_descriptor()?;

    let path = match target {
        DecodeTarget::File(path) => path.clone(),
        DecodeTarget::Dir { dir, stem } => decoded_path(dir, stem, &descriptor.extension)?,
    };
    if !opts.overwrite && path.exists() {
        return Err(ReelError::validation(format!(
            "output file '{}' already exists",
            path.display()
        )));
    }
    ensure_parent_dir(&path)?;

    let partial = partial_path(&path);
    let file = File::create(&partial)
        .with_context(|| format!("failed to create '{}'", partial.display()))?;

    let written = stream
        .write_payload(BufWriter::new(file))
        .and_then(|(out, stats)| {
            out.into_inner()
                .map_err(|e| e.into_error())
                .and_then(|f| f.sync_all())
                .with_context(|| format!("failed to flush '{}'", partial.display()))?;
            Ok(stats)
        });
    drop(stream);
    let written = written.and_then(|stats| {
        source.finish()?;
        Ok(stats)
    });

    let stats = match written {
        Ok(stats) => stats,
        Err(e) => {
            let _ = source.finish();
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
    };

    std::fs::rename(&partial, &path).with_context(|| {
        format!(
            "failed to move '{}' to '{}'",
            partial.display(),
            path.display()
        )
    })?;

    tracing::info!(
        path = %path.display(),
        bytes = stats.bytes,
        payload_frames = stats.payload_frames,
        "decode session complete"
    );
    Ok(DecodedFile {
        path,
        descriptor,
        stats,
    })
}

/// Decode the frames of `source` into memory.
pub fn decode_to_vec(
    source: &mut dyn FrameSource,
    resolution: Resolution,
) -> ReelResult<(FileDescriptor, Vec<u8>)> {
    let mut stream = DecodeStream::new(&mut *source, resolution);
    let desc = stream.read_descriptor()?;
    // The size is untrusted until the payload actually arrives.
    let capacity = desc.file_size.min(PREALLOC_LIMIT) as usize;
    let result = stream.write_payload(Vec::with_capacity(capacity));
    drop(stream);
    let finished = source.finish();
    let (bytes, _) = result?;
    finished?;
    Ok((desc, bytes))
}

/// Read only the metadata frame of `source`, then release it.
pub fn read_descriptor(
    source: &mut dyn FrameSource,
    resolution: Resolution,
) -> ReelResult<FileDescriptor> {
    let desc = DecodeStream::new(&mut *source, resolution).read_descriptor();
    let finished = source.finish();
    let desc = desc?;
    finished?;
    Ok(desc)
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
