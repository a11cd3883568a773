//! Metadata frame codec.
//!
//! Frame 0 of every encoded video carries the file size (row 0, decimal ASCII digits) and the file
//! extension (row 1, UTF-8 bytes). Each row ends with a sentinel pixel whose channel 0 is `255`.
//! Payload frames carry no length information, so this frame is the only ground truth on decode.

use crate::foundation::core::Resolution;
use crate::foundation::error::{MetadataRow, ReelError, ReelResult};
use crate::frame::FrameRgb;

/// Channel-0 value marking the end of a metadata row.
pub const SENTINEL: u8 = 255;

const SIZE_ROW: u32 = 0;
const EXTENSION_ROW: u32 = 1;

/// What the metadata frame records about the encoded file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileDescriptor {
    /// File length in bytes.
    pub file_size: u64,
    /// Extension without the leading dot; empty when the file has none.
    pub extension: String,
}

impl FileDescriptor {
    pub fn new(file_size: u64, extension: impl Into<String>) -> Self {
        Self {
            file_size,
            extension: extension.into(),
        }
    }

    /// Number of payload frames following the metadata frame at `res`.
    pub fn payload_frames(&self, res: Resolution) -> u64 {
        res.payload_frames_for(self.file_size)
    }

    /// Check that both rows fit `res` with room for their sentinels.
    pub fn check_fits(&self, res: Resolution) -> ReelResult<()> {
        check_rows(res)?;
        let size_len = self.file_size.to_string().len();
        if size_len >= res.width as usize {
            return Err(ReelError::MetadataOverflow {
                field: MetadataRow::Size,
                len: size_len,
                width: res.width,
            });
        }
        let ext_len = self.extension.len();
        if ext_len >= res.width as usize {
            return Err(ReelError::MetadataOverflow {
                field: MetadataRow::Extension,
                len: ext_len,
                width: res.width,
            });
        }
        Ok(())
    }
}

fn check_rows(res: Resolution) -> ReelResult<()> {
    if res.height < 2 {
        return Err(ReelError::invalid_resolution(format!(
            "{res}: the metadata frame needs at least 2 rows"
        )));
    }
    Ok(())
}

/// Encode `desc` into a metadata frame.
///
/// Fails with [`ReelError::MetadataOverflow`] before touching any pixel when either row would
/// collide with its sentinel column.
pub fn encode_metadata(desc: &FileDescriptor, res: Resolution) -> ReelResult<FrameRgb> {
    desc.check_fits(res)?;

    let mut frame = FrameRgb::black(res);
    write_row(&mut frame, SIZE_ROW, desc.file_size.to_string().as_bytes());
    write_row(&mut frame, EXTENSION_ROW, desc.extension.as_bytes());
    Ok(frame)
}

fn write_row(frame: &mut FrameRgb, y: u32, bytes: &[u8]) {
    for (x, &b) in (0u32..).zip(bytes) {
        frame.pixel_mut(x, y).fill(b);
    }
    // Only channel 0 carries the sentinel; G and B keep the replicated zero.
    frame.pixel_mut(bytes.len() as u32, y)[0] = SENTINEL;
}

/// Recover the [`FileDescriptor`] from a metadata frame.
pub fn decode_metadata(frame: &FrameRgb, res: Resolution) -> ReelResult<FileDescriptor> {
    check_rows(res)?;
    frame.check_shape(res)?;

    let digits = read_row(frame, SIZE_ROW, MetadataRow::Size)?;
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ReelError::corrupt_metadata(format!(
            "size row is not a decimal number: {:?}",
            String::from_utf8_lossy(&digits)
        )));
    }
    // All ASCII digits, so this is valid UTF-8; only overflow can fail.
    let file_size = std::str::from_utf8(&digits)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| ReelError::corrupt_metadata("size row overflows u64"))?;

    let ext = read_row(frame, EXTENSION_ROW, MetadataRow::Extension)?;
    let extension = String::from_utf8(ext)
        .map_err(|e| ReelError::corrupt_metadata(format!("extension row is not UTF-8: {e}")))?;

    Ok(FileDescriptor {
        file_size,
        extension,
    })
}

/// Channel-0 bytes of row `y` up to (not including) the first sentinel.
fn read_row(frame: &FrameRgb, y: u32, row: MetadataRow) -> ReelResult<Vec<u8>> {
    let mut out = Vec::new();
    for v in frame.row_channel0(y) {
        if v == SENTINEL {
            return Ok(out);
        }
        out.push(v);
    }
    Err(ReelError::DecodeSentinelNotFound { row })
}

#[cfg(test)]
#[path = "../../tests/unit/codec/metadata.rs"]
mod tests;
