use super::*;
use crate::foundation::error::ReelError;

fn res(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

fn stream(bytes: &[u8], r: Resolution) -> EncodeStream<&[u8]> {
    EncodeStream::new(bytes, FileDescriptor::new(bytes.len() as u64, "bin"), r).unwrap()
}

#[test]
fn walks_start_metadata_payload_done() {
    let bytes = [0x41u8; 10];
    let mut s = stream(&bytes, res(4, 2));
    assert_eq!(s.state(), StreamState::Start);
    assert_eq!(s.total_frames(), 3);

    let (idx, _) = s.next_frame().unwrap().unwrap();
    assert_eq!((idx, s.state()), (FrameIndex(0), StreamState::Metadata));
    let (idx, _) = s.next_frame().unwrap().unwrap();
    assert_eq!((idx, s.state()), (FrameIndex(1), StreamState::Payload(1)));
    let (idx, _) = s.next_frame().unwrap().unwrap();
    assert_eq!((idx, s.state()), (FrameIndex(2), StreamState::Payload(2)));

    assert!(s.next_frame().unwrap().is_none());
    assert_eq!(s.state(), StreamState::Done);
    assert!(s.next_frame().unwrap().is_none());
    assert_eq!(s.payload_bytes(), 10);
}

#[test]
fn empty_input_yields_only_metadata() {
    let frames: Vec<_> = stream(&[], res(4, 2))
        .collect::<ReelResult<Vec<_>>>()
        .unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, FrameIndex(0));
}

#[test]
fn overflow_is_detected_before_any_frame() {
    let bytes = vec![0u8; 100];
    let err = EncodeStream::new(&bytes[..], FileDescriptor::new(100, ""), res(2, 2))
        .err()
        .unwrap();
    assert!(matches!(err, ReelError::MetadataOverflow { .. }));
}

#[test]
fn short_input_ends_the_stream_with_an_error() {
    let bytes = [1u8; 3];
    let mut s = EncodeStream::new(&bytes[..], FileDescriptor::new(9, "x"), res(2, 2)).unwrap();
    assert!(s.next_frame().unwrap().is_some());
    assert!(matches!(
        s.next_frame().unwrap_err(),
        ReelError::TruncatedStream {
            expected: 9,
            got: 3
        }
    ));
    assert_eq!(s.state(), StreamState::Done);
    assert!(s.next_frame().unwrap().is_none());
}

#[test]
fn open_reads_size_and_extension_from_the_file() {
    let dir = std::path::PathBuf::from("target").join("encode_stream_open");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sample.data.txt");
    std::fs::write(&path, b"hello world").unwrap();

    let s = EncodeStream::open(&path, res(8, 2)).unwrap();
    assert_eq!(s.descriptor(), &FileDescriptor::new(11, "txt"));
    // 11 bytes fit one 16-byte payload frame.
    assert_eq!(s.total_frames(), 2);
}
