use crate::foundation::error::{ReelError, ReelResult};

/// Absolute 0-based frame index in the encoded video. Index 0 is the metadata frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frame grid size in pixels, fixed for an entire session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution.
    ///
    /// Both sides must be non-zero and a full RGB24 frame (`width * height * 3` bytes) must be
    /// addressable.
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::invalid_resolution(format!(
                "{width}x{height}: width and height must be positive"
            )));
        }
        let frame_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3));
        if frame_len.is_none() {
            return Err(ReelError::invalid_resolution(format!(
                "{width}x{height}: frame too large"
            )));
        }
        Ok(Self { width, height })
    }

    /// Parse `"<width>x<height>"`, e.g. `"1920x1080"`.
    pub fn parse(s: &str) -> ReelResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| ReelError::invalid_resolution(format!("'{s}': expected WIDTHxHEIGHT")))?;

        // `u32::from_str` accepts a leading '+', which is not a resolution.
        let side = |part: &str, name: &str| -> ReelResult<u32> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ReelError::invalid_resolution(format!(
                    "'{s}': {name} '{part}' is not a positive integer"
                )));
            }
            part.parse::<u32>().map_err(|e| {
                ReelError::invalid_resolution(format!("'{s}': {name} '{part}': {e}"))
            })
        };

        Self::new(side(w, "width")?, side(h, "height")?)
    }

    /// Payload bytes carried by one frame (`width * height`).
    pub fn bytes_per_frame(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Serialized RGB24 frame length (`width * height * 3`).
    pub fn frame_len(self) -> usize {
        self.bytes_per_frame() * 3
    }

    /// Number of payload frames needed for `file_size` bytes.
    pub fn payload_frames_for(self, file_size: u64) -> u64 {
        file_size.div_ceil(self.bytes_per_frame() as u64)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Frames-per-second represented as a rational `num/den`.
///
/// Only the external transport cares about this; framing is independent of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
