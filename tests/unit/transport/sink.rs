use super::*;
use crate::transport::source::FrameSource;

fn cfg() -> SinkConfig {
    SinkConfig {
        resolution: Resolution::new(2, 2).unwrap(),
        fps: Fps::default(),
    }
}

#[test]
fn push_before_begin_is_rejected() {
    let mut sink = InMemorySink::new();
    let frame = FrameRgb::black(cfg().resolution);
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn enforces_order_and_shape() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let frame = FrameRgb::black(cfg().resolution);
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame).is_err());

    let wrong = FrameRgb::black(Resolution::new(4, 1).unwrap());
    assert!(sink.push_frame(FrameIndex(2), &wrong).is_err());

    sink.end().unwrap();
    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config(), Some(cfg()));
}

#[test]
fn into_source_replays_in_order() {
    let r = cfg().resolution;
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    for i in 0..3u8 {
        let f = FrameRgb::from_gray(r, &[i]).unwrap();
        sink.push_frame(FrameIndex(u64::from(i)), &f).unwrap();
    }

    let mut src = sink.into_source();
    for i in 0..3u8 {
        let f = src.next_frame().unwrap().unwrap();
        assert_eq!(f.data[0], i);
    }
    assert!(src.next_frame().unwrap().is_none());
    assert_eq!(src.pulled(), 3);
    assert_eq!(src.remaining(), 0);
}
