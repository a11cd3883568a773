use super::*;

#[test]
fn codecs_never_subsample_chroma() {
    for codec in [LosslessCodec::Png, LosslessCodec::Ffv1, LosslessCodec::X264rgb] {
        let args = codec.output_args();
        assert!(!args.iter().any(|a| a.contains("yuv")), "{codec:?}: {args:?}");
        let pix = args
            .iter()
            .position(|a| *a == "-pix_fmt")
            .map(|i| args[i + 1]);
        assert!(matches!(pix, Some("rgb24" | "bgr0")), "{codec:?}");
    }
    assert!(LosslessCodec::X264rgb.output_args().contains(&"-qp"));
}

#[test]
fn sink_opts_default_to_png_overwrite() {
    let opts = FfmpegSinkOpts::new("out/video.mkv");
    assert_eq!(opts.codec, LosslessCodec::Png);
    assert!(opts.overwrite);
    assert_eq!(opts.threads, None);
}

#[test]
fn sink_rejects_frames_before_begin() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/never.mkv"));
    let frame = FrameRgb::black(Resolution::new(2, 2).unwrap());
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame).unwrap_err(),
        ReelError::Validation(_)
    ));
    assert!(sink.end().is_err());
}

#[test]
fn source_rejects_missing_input() {
    let err = FfmpegSource::open(FfmpegSourceOpts {
        in_path: PathBuf::from("target/does/not/exist.mkv"),
        resolution: Resolution::new(2, 2).unwrap(),
    })
    .err()
    .unwrap();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn ensure_parent_dir_accepts_bare_file_names() {
    ensure_parent_dir(Path::new("video.mkv")).unwrap();
    let dir = PathBuf::from("target").join("ensure_parent_dir_test");
    let _ = std::fs::remove_dir_all(&dir);
    ensure_parent_dir(&dir.join("nested").join("out.mkv")).unwrap();
    assert!(dir.join("nested").is_dir());
}

#[test]
fn dropping_an_unfinished_sink_removes_the_video() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = PathBuf::from("target").join("ffmpeg_sink_abort");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("aborted.mkv");
    std::fs::write(&out, b"stale").unwrap();

    let res = Resolution::new(16, 16).unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(SinkConfig {
        resolution: res,
        fps: Fps::default(),
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &FrameRgb::black(res)).unwrap();
    drop(sink);

    assert!(!out.exists());
}
