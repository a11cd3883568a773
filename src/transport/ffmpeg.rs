use crate::foundation::core::{Fps, FrameIndex, Resolution};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::FrameRgb;
use crate::transport::sink::{FrameSink, SinkConfig};
use crate::transport::source::FrameSource;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

type StderrDrain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Per-frame lossless video codecs.
///
/// Anything with chroma subsampling or quantization would break the byte round trip, so only
/// these are offered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LosslessCodec {
    /// PNG-compressed frames.
    #[default]
    Png,
    /// FFV1 intra-frame lossless.
    Ffv1,
    /// x264 in RGB mode with `-qp 0`.
    X264rgb,
}

impl LosslessCodec {
    fn output_args(self) -> &'static [&'static str] {
        match self {
            Self::Png => &["-c:v", "png", "-pix_fmt", "rgb24"],
            Self::Ffv1 => &["-c:v", "ffv1", "-level", "3", "-pix_fmt", "bgr0"],
            Self::X264rgb => &[
                "-c:v",
                "libx264rgb",
                "-qp",
                "0",
                "-preset",
                "veryfast",
                "-pix_fmt",
                "rgb24",
            ],
        }
    }
}

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output video path. The container follows the extension (`.mkv` recommended).
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Lossless codec used for every frame.
    pub codec: LosslessCodec,
    /// `ffmpeg -threads`; `None` leaves the choice to ffmpeg.
    pub threads: Option<u32>,
}

impl FfmpegSinkOpts {
    /// Create options for writing a PNG-coded video to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: LosslessCodec::default(),
            threads: None,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB24 frames to its stdin.
///
/// Dropping a sink that was started but not ended kills the child process and removes the
/// partial video.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<StderrDrain>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if self.child.is_some() {
            return Err(ReelError::validation("ffmpeg sink already started"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ReelError::transport(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &cfg.resolution.to_string(),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        cmd.args(self.opts.codec.output_args());
        if let Some(threads) = self.opts.threads {
            cmd.args(["-threads", &threads.to_string()]);
        }
        cmd.arg(&self.opts.out_path);

        tracing::debug!(?cmd, "spawning ffmpeg encoder");
        let mut child = cmd.spawn().map_err(|e| {
            ReelError::transport(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::transport("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr_drain = spawn_stderr_drain(&mut child)?;

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::validation("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::validation(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        frame.check_shape(cfg.resolution)?;
        self.last_idx = Some(idx);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::validation("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&frame.data) {
            // A broken pipe means ffmpeg already died; its stderr says why.
            let detail = self.reap().err().map(|e| e.to_string()).unwrap_or_default();
            self.discard_output();
            return Err(ReelError::transport(format!(
                "failed to write frame {} to ffmpeg stdin: {e}. {detail}",
                idx.0
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        if self.child.is_none() {
            return Err(ReelError::validation("ffmpeg sink not started"));
        }
        let reaped = self.reap();
        self.cfg = None;
        if reaped.is_err() {
            self.discard_output();
        }
        reaped
    }
}

impl FfmpegSink {
    /// Close stdin, wait for the child and surface a non-zero exit with its stderr.
    fn reap(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| ReelError::transport(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = join_stderr_drain(self.stderr_drain.take())?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::transport(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Remove whatever ffmpeg wrote for a session that did not complete.
    fn discard_output(&self) {
        if let Err(e) = std::fs::remove_file(&self.opts.out_path)
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!(
                out = %self.opts.out_path.display(),
                error = %e,
                "failed to remove incomplete video"
            );
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            tracing::warn!(out = %self.opts.out_path.display(), "aborting unfinished ffmpeg encode");
            let _ = child.kill();
            let _ = child.wait();
            self.discard_output();
        }
    }
}

/// Options for [`FfmpegSource`].
#[derive(Clone, Debug)]
pub struct FfmpegSourceOpts {
    /// Input video path.
    pub in_path: PathBuf,
    /// Frame size of the video stream; see [`probe_resolution`].
    pub resolution: Resolution,
}

/// Source that spawns the system `ffmpeg` and reads raw RGB24 frames from its stdout.
///
/// Frames are decoded on demand; the pipe provides backpressure. Dropping the source before the
/// stream ends kills the child.
pub struct FfmpegSource {
    opts: FfmpegSourceOpts,

    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<StderrDrain>,

    eof: bool,
}

impl FfmpegSource {
    /// Spawn `ffmpeg` decoding `opts.in_path`.
    pub fn open(opts: FfmpegSourceOpts) -> ReelResult<Self> {
        if !opts.in_path.is_file() {
            return Err(ReelError::validation(format!(
                "input video '{}' does not exist",
                opts.in_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelError::transport(
                "ffmpeg is required for video decoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args(["-loglevel", "error", "-i"])
            .arg(&opts.in_path)
            .args([
                "-map",
                "0:v:0",
                "-vsync",
                "passthrough",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "pipe:1",
            ]);

        tracing::debug!(?cmd, "spawning ffmpeg decoder");
        let mut child = cmd.spawn().map_err(|e| {
            ReelError::transport(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::transport("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr_drain = spawn_stderr_drain(&mut child)?;

        Ok(Self {
            opts,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            eof: false,
        })
    }
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> ReelResult<Option<FrameRgb>> {
        if self.eof {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(ReelError::validation("ffmpeg source is already finalized"));
        };

        let mut data = vec![0u8; self.opts.resolution.frame_len()];
        let mut filled = 0;
        while filled < data.len() {
            match stdout.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ReelError::transport(format!(
                        "failed to read frame from ffmpeg stdout: {e}"
                    )));
                }
            }
        }

        if filled == 0 {
            self.eof = true;
            return Ok(None);
        }
        if filled < data.len() {
            self.eof = true;
            return Err(ReelError::transport(format!(
                "ffmpeg produced a partial frame ({filled} of {} bytes); is {} the video's resolution?",
                data.len(),
                self.opts.resolution
            )));
        }
        FrameRgb::from_rgb24(self.opts.resolution, data).map(Some)
    }

    fn finish(&mut self) -> ReelResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if !self.eof {
            // The consumer stopped early; ffmpeg would otherwise block on a full pipe.
            let _ = child.kill();
            let _ = child.wait();
            let _ = join_stderr_drain(self.stderr_drain.take());
            return Ok(());
        }

        let status = child
            .wait()
            .map_err(|e| ReelError::transport(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = join_stderr_drain(self.stderr_drain.take())?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::transport(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_stderr_drain(child: &mut Child) -> ReelResult<StderrDrain> {
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ReelError::transport("failed to open ffmpeg stderr (unexpected)"))?;
    Ok(std::thread::spawn(move || {
        let mut stderr_bytes = Vec::new();
        stderr.read_to_end(&mut stderr_bytes)?;
        Ok(stderr_bytes)
    }))
}

fn join_stderr_drain(handle: Option<StderrDrain>) -> ReelResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| ReelError::transport("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| ReelError::transport(format!("ffmpeg stderr read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Probe the frame size of the first video stream through `ffprobe`.
pub fn probe_resolution(path: &Path) -> ReelResult<Resolution> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| ReelError::transport(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::transport(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::transport(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReelError::transport("no video stream found"))?;
    let width = video
        .width
        .ok_or_else(|| ReelError::transport("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| ReelError::transport("missing video height from ffprobe"))?;
    Resolution::new(width, height)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_on_path("ffprobe")
}

fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/transport/ffmpeg.rs"]
mod tests;
