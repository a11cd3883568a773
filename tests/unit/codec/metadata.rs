use super::*;

fn res(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

#[test]
fn encode_places_digits_extension_and_sentinels() {
    let frame = encode_metadata(&FileDescriptor::new(10, "bin"), res(4, 2)).unwrap();

    assert_eq!(
        &frame.data[..12],
        &[0x31, 0x31, 0x31, 0x30, 0x30, 0x30, 0xFF, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        &frame.data[12..],
        &[0x62, 0x62, 0x62, 0x69, 0x69, 0x69, 0x6E, 0x6E, 0x6E, 0xFF, 0, 0]
    );
}

#[test]
fn rows_beyond_the_first_two_stay_zero() {
    let frame = encode_metadata(&FileDescriptor::new(123, "txt"), res(8, 4)).unwrap();
    assert!(frame.data[8 * 3 * 2..].iter().all(|&b| b == 0));
}

#[test]
fn decode_recovers_descriptor() {
    let r = res(24, 3);
    for desc in [
        FileDescriptor::new(0, ""),
        FileDescriptor::new(10, "bin"),
        FileDescriptor::new(123_456_789, "tar.gz"),
        FileDescriptor::new(u64::MAX, "x"),
    ] {
        let frame = encode_metadata(&desc, r).unwrap();
        assert_eq!(decode_metadata(&frame, r).unwrap(), desc);
    }
}

#[test]
fn size_with_width_digits_overflows() {
    // 2 columns leave room for one digit plus the sentinel.
    let err = encode_metadata(&FileDescriptor::new(100, ""), res(2, 2)).unwrap_err();
    assert!(matches!(
        err,
        ReelError::MetadataOverflow {
            field: MetadataRow::Size,
            len: 3,
            width: 2
        }
    ));
    let err = encode_metadata(&FileDescriptor::new(10, ""), res(2, 2)).unwrap_err();
    assert!(matches!(err, ReelError::MetadataOverflow { .. }));
    assert!(encode_metadata(&FileDescriptor::new(9, "a"), res(2, 2)).is_ok());
}

#[test]
fn extension_with_width_bytes_overflows() {
    let err = encode_metadata(&FileDescriptor::new(1, "abcd"), res(4, 2)).unwrap_err();
    assert!(matches!(
        err,
        ReelError::MetadataOverflow {
            field: MetadataRow::Extension,
            len: 4,
            width: 4
        }
    ));
}

#[test]
fn single_row_resolution_cannot_carry_metadata() {
    let err = encode_metadata(&FileDescriptor::new(1, ""), res(8, 1)).unwrap_err();
    assert!(matches!(err, ReelError::InvalidResolution(_)));
}

#[test]
fn missing_sentinel_is_reported_per_row() {
    let r = res(4, 2);
    let mut frame = FrameRgb::black(r);
    let err = decode_metadata(&frame, r).unwrap_err();
    assert!(matches!(
        err,
        ReelError::DecodeSentinelNotFound {
            row: MetadataRow::Size
        }
    ));

    frame.pixel_mut(0, 0).fill(b'5');
    frame.pixel_mut(1, 0)[0] = SENTINEL;
    let err = decode_metadata(&frame, r).unwrap_err();
    assert!(matches!(
        err,
        ReelError::DecodeSentinelNotFound {
            row: MetadataRow::Extension
        }
    ));
}

#[test]
fn non_digit_size_row_is_corrupt() {
    let r = res(4, 2);
    let mut frame = encode_metadata(&FileDescriptor::new(12, "a"), r).unwrap();
    frame.pixel_mut(0, 0).fill(b'z');
    assert!(matches!(
        decode_metadata(&frame, r).unwrap_err(),
        ReelError::CorruptMetadata(_)
    ));

    let mut frame = FrameRgb::black(r);
    frame.pixel_mut(0, 0)[0] = SENTINEL;
    frame.pixel_mut(0, 1)[0] = SENTINEL;
    assert!(matches!(
        decode_metadata(&frame, r).unwrap_err(),
        ReelError::CorruptMetadata(_)
    ));
}

#[test]
fn decode_rejects_frames_of_the_wrong_shape() {
    let frame = encode_metadata(&FileDescriptor::new(1, "a"), res(4, 2)).unwrap();
    assert!(matches!(
        decode_metadata(&frame, res(2, 4)).unwrap_err(),
        ReelError::Validation(_)
    ));
}
