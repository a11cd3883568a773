use super::*;

#[test]
fn parse_accepts_width_x_height() {
    let r = Resolution::parse("4x2").unwrap();
    assert_eq!(r, Resolution { width: 4, height: 2 });
    assert_eq!(r.bytes_per_frame(), 8);
    assert_eq!(r.frame_len(), 24);
    assert_eq!(r.to_string(), "4x2");

    let r: Resolution = "1920X1080".parse().unwrap();
    assert_eq!(r.bytes_per_frame(), 1920 * 1080);
}

#[test]
fn parse_rejects_malformed_input() {
    for bad in ["", "4", "4x", "x2", "0x2", "4x0", "-4x2", "4x-2", "+4x2", "ax2", "4 x 2", "4x2x1"] {
        let err = Resolution::parse(bad).unwrap_err();
        assert!(
            matches!(err, ReelError::InvalidResolution(_)),
            "{bad:?} gave {err}"
        );
    }
}

#[test]
fn payload_frame_count_rounds_up() {
    let r = Resolution::new(4, 2).unwrap();
    assert_eq!(r.payload_frames_for(0), 0);
    assert_eq!(r.payload_frames_for(7), 1);
    assert_eq!(r.payload_frames_for(8), 1);
    assert_eq!(r.payload_frames_for(9), 2);
    assert_eq!(r.payload_frames_for(80), 10);
}

#[test]
fn fps_validation() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::default(), Fps::new(30, 1).unwrap());
}

#[test]
fn oversized_frames_are_rejected() {
    let err = Resolution::parse("4294967295x4294967295").unwrap_err();
    assert!(matches!(err, ReelError::InvalidResolution(_)), "{err}");
    assert!(matches!(
        Resolution::new(u32::MAX, u32::MAX).unwrap_err(),
        ReelError::InvalidResolution(_)
    ));
}
