/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Which metadata row a failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataRow {
    /// Row 0: decimal digits of the file size.
    Size,
    /// Row 1: file extension bytes.
    Extension,
}

impl std::fmt::Display for MetadataRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Size => f.write_str("size"),
            Self::Extension => f.write_str("extension"),
        }
    }
}

/// Errors produced while framing files into video frames and back.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed or non-positive `WIDTHxHEIGHT`.
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    /// A metadata row would not leave room for its sentinel pixel.
    #[error(
        "metadata overflow: {field} needs {len} columns plus a sentinel, frame is {width} wide"
    )]
    MetadataOverflow {
        /// Offending row.
        field: MetadataRow,
        /// Data length in bytes (or row count when the frame is too short).
        len: usize,
        /// Frame width in pixels.
        width: u32,
    },

    /// No sentinel pixel terminates a metadata row.
    #[error("metadata {row} row has no sentinel pixel")]
    DecodeSentinelNotFound {
        /// Row that was scanned.
        row: MetadataRow,
    },

    /// A sentinel was found but the row data cannot be interpreted.
    #[error("corrupt metadata: {0}")]
    CorruptMetadata(String),

    /// The frame source (or the input file) ended early.
    #[error("truncated stream: expected {expected} bytes, got {got}")]
    TruncatedStream {
        /// Bytes required by the metadata frame.
        expected: u64,
        /// Bytes actually available.
        got: u64,
    },

    /// The external video transport failed.
    #[error("external transport failure: {0}")]
    ExternalTransport(String),

    /// Invalid options or API misuse.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn invalid_resolution(msg: impl Into<String>) -> Self {
        Self::InvalidResolution(msg.into())
    }

    pub fn corrupt_metadata(msg: impl Into<String>) -> Self {
        Self::CorruptMetadata(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::ExternalTransport(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
