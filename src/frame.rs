use crate::foundation::core::Resolution;
use crate::foundation::error::{ReelError, ReelResult};

/// A frame as RGB24 pixels.
///
/// `height` rows of `width` pixels, row-major, channel-interleaved (R,G,B), no row padding.
/// This is exactly the byte layout written to and read from the video transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB24 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// All-zero frame.
    pub fn black(res: Resolution) -> Self {
        Self {
            width: res.width,
            height: res.height,
            data: vec![0u8; res.frame_len()],
        }
    }

    /// Wrap raw RGB24 bytes, checking the length against `res`.
    pub fn from_rgb24(res: Resolution, data: Vec<u8>) -> ReelResult<Self> {
        if data.len() != res.frame_len() {
            return Err(ReelError::validation(format!(
                "frame data is {} bytes, expected {} for {res}",
                data.len(),
                res.frame_len()
            )));
        }
        Ok(Self {
            width: res.width,
            height: res.height,
            data,
        })
    }

    /// Build a frame whose R, G and B channels all carry `gray[i]` at pixel `i`.
    ///
    /// `gray` shorter than `width * height` is zero-padded on its tail.
    pub fn from_gray(res: Resolution, gray: &[u8]) -> ReelResult<Self> {
        if gray.len() > res.bytes_per_frame() {
            return Err(ReelError::validation(format!(
                "chunk of {} bytes does not fit a {res} frame",
                gray.len()
            )));
        }
        let mut frame = Self::black(res);
        for (px, &v) in frame.data.chunks_exact_mut(3).zip(gray) {
            px.fill(v);
        }
        Ok(frame)
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Channel 0 of every pixel, in pixel order.
    pub fn channel0(&self) -> impl Iterator<Item = u8> + '_ {
        self.data.iter().step_by(3).copied()
    }

    /// Channel 0 of the pixels in row `y`.
    pub fn row_channel0(&self, y: u32) -> impl Iterator<Item = u8> + '_ {
        let stride = self.width as usize * 3;
        let start = y as usize * stride;
        self.data[start..start + stride].iter().step_by(3).copied()
    }

    /// Mutable RGB triple at `(x, y)`.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let off = (y as usize * self.width as usize + x as usize) * 3;
        &mut self.data[off..off + 3]
    }

    /// Check that this frame matches `res` in both shape and byte length.
    pub fn check_shape(&self, res: Resolution) -> ReelResult<()> {
        if self.width != res.width || self.height != res.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {res}",
                self.width, self.height
            )));
        }
        if self.data.len() != res.frame_len() {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*3",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/frame.rs"]
mod tests;
