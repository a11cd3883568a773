use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::invalid_resolution("x")
            .to_string()
            .contains("invalid resolution:")
    );
    assert!(
        ReelError::corrupt_metadata("x")
            .to_string()
            .contains("corrupt metadata:")
    );
    assert!(
        ReelError::transport("x")
            .to_string()
            .contains("external transport failure:")
    );
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn structured_variants_render_their_fields() {
    let err = ReelError::MetadataOverflow {
        field: MetadataRow::Size,
        len: 3,
        width: 2,
    };
    assert_eq!(
        err.to_string(),
        "metadata overflow: size needs 3 columns plus a sentinel, frame is 2 wide"
    );

    let err = ReelError::DecodeSentinelNotFound {
        row: MetadataRow::Extension,
    };
    assert_eq!(err.to_string(), "metadata extension row has no sentinel pixel");

    let err = ReelError::TruncatedStream {
        expected: 10,
        got: 8,
    };
    assert_eq!(
        err.to_string(),
        "truncated stream: expected 10 bytes, got 8"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
