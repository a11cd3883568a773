//! Byte <-> frame codecs.

/// Metadata frame (file size and extension).
pub mod metadata;
/// Payload chunking and reassembly.
pub mod payload;
