use super::*;
use crate::transport::source::InMemorySource;

#[test]
fn encode_opts_reject_bad_fps() {
    let opts = EncodeOpts {
        fps: Fps { num: 30, den: 0 },
        ..Default::default()
    };
    assert!(matches!(opts.validate().unwrap_err(), ReelError::Validation(_)));
    assert!(EncodeOpts::default().validate().is_ok());
}

#[test]
fn decode_opts_need_room_for_metadata() {
    let opts = DecodeOpts::new(Resolution {
        width: 8,
        height: 1,
    });
    assert!(matches!(
        opts.validate().unwrap_err(),
        ReelError::InvalidResolution(_)
    ));
    let opts = DecodeOpts::new(Resolution {
        width: 0,
        height: 4,
    });
    assert!(opts.validate().is_err());
    assert!(DecodeOpts::new(Resolution::new(4, 2).unwrap()).validate().is_ok());
}

#[test]
fn invalid_decode_opts_touch_nothing() {
    let out = PathBuf::from("target").join("session_invalid_opts.bin");
    let _ = std::fs::remove_file(&out);
    let mut source = InMemorySource::new([crate::frame::FrameRgb::black(
        Resolution::new(4, 2).unwrap(),
    )]);
    let opts = DecodeOpts::new(Resolution {
        width: 4,
        height: 1,
    });
    assert!(decode_to_file(&mut source, &DecodeTarget::File(out.clone()), &opts).is_err());
    assert_eq!(source.pulled(), 0);
    assert!(!out.exists());
}
