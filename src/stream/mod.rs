//! Frame streams: the metadata frame followed by payload frames, in strict order.
//!
//! Both directions walk the same states: `Start -> Metadata -> Payload(i) -> Done`. The payload
//! frame count is never transmitted; it follows from the file size in the metadata frame.

/// Decode direction (frames -> bytes).
pub mod decode;
/// Encode direction (bytes -> frames).
pub mod encode;

/// Position of a frame stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Nothing transferred yet.
    Start,
    /// The metadata frame (index 0) was transferred.
    Metadata,
    /// Payload frame `i` (1-based frame index) was transferred.
    Payload(u64),
    /// Terminal; no further frames.
    Done,
}
