//! Payload frames: file bytes in `width * height` windows, one byte per pixel replicated into R, G
//! and B. The last window is zero-padded; the padding is dropped again on reassembly using the
//! size recovered from the metadata frame.

use std::io::{ErrorKind, Read, Write};

use anyhow::Context as _;

use crate::foundation::core::Resolution;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::FrameRgb;

/// Lazy, finite payload frame producer over a byte reader.
///
/// Reads exactly `file_size` bytes from `reader`, one `bytes_per_frame` window per call. Anything
/// after `file_size` is never read. Not restartable: a fresh session needs a fresh reader.
pub struct PayloadChunker<R> {
    reader: R,
    res: Resolution,
    file_size: u64,
    consumed: u64,
    buf: Vec<u8>,
    failed: bool,
}

impl<R: Read> PayloadChunker<R> {
    pub fn new(reader: R, res: Resolution, file_size: u64) -> Self {
        Self {
            reader,
            res,
            file_size,
            consumed: 0,
            buf: vec![0u8; res.bytes_per_frame()],
            failed: false,
        }
    }

    /// Bytes handed out so far (without padding).
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Produce the next payload frame, or `None` once `file_size` bytes were emitted.
    pub fn next_frame(&mut self) -> ReelResult<Option<FrameRgb>> {
        if self.failed {
            return Ok(None);
        }
        let remaining = self.file_size - self.consumed;
        if remaining == 0 {
            return Ok(None);
        }

        let want = remaining.min(self.buf.len() as u64) as usize;
        let got = match read_full(&mut self.reader, &mut self.buf[..want]) {
            Ok(got) => got,
            Err(e) => {
                self.failed = true;
                return Err(e);
            }
        };
        if got < want {
            self.failed = true;
            return Err(ReelError::TruncatedStream {
                expected: self.file_size,
                got: self.consumed + got as u64,
            });
        }
        self.consumed += got as u64;

        FrameRgb::from_gray(self.res, &self.buf[..got]).map(Some)
    }
}

impl<R: Read> Iterator for PayloadChunker<R> {
    type Item = ReelResult<FrameRgb>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> ReelResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(anyhow::Error::new(e).context("failed to read input").into()),
        }
    }
    Ok(filled)
}

/// Payload frame consumer writing recovered bytes to `out`.
///
/// Channel 0 is authoritative. Each frame contributes `min(bytes_per_frame, remaining)` bytes, so
/// the zero padding of the final frame never reaches `out`.
pub struct PayloadReassembler<W> {
    out: W,
    res: Resolution,
    file_size: u64,
    written: u64,
    scratch: Vec<u8>,
}

impl<W: Write> PayloadReassembler<W> {
    pub fn new(out: W, res: Resolution, file_size: u64) -> Self {
        Self {
            out,
            res,
            file_size,
            written: 0,
            scratch: Vec::with_capacity(res.bytes_per_frame()),
        }
    }

    /// `true` once `file_size` bytes were written.
    pub fn is_complete(&self) -> bool {
        self.written == self.file_size
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append one payload frame.
    pub fn push(&mut self, frame: &FrameRgb) -> ReelResult<()> {
        frame.check_shape(self.res)?;
        if self.is_complete() {
            return Err(ReelError::validation(
                "payload frame pushed after the file was fully reassembled",
            ));
        }

        let take = (self.file_size - self.written).min(self.res.bytes_per_frame() as u64) as usize;
        self.scratch.clear();
        self.scratch.extend(frame.channel0().take(take));
        self.out
            .write_all(&self.scratch)
            .context("failed to write reassembled bytes")?;
        self.written += take as u64;
        Ok(())
    }

    /// Flush and return the writer; fails when fewer than `file_size` bytes arrived.
    pub fn finish(mut self) -> ReelResult<W> {
        if !self.is_complete() {
            return Err(ReelError::TruncatedStream {
                expected: self.file_size,
                got: self.written,
            });
        }
        self.out
            .flush()
            .context("failed to flush reassembled bytes")?;
        Ok(self.out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/payload.rs"]
mod tests;
