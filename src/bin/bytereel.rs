use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bytereel::{
    DecodeOpts, DecodeTarget, EncodeOpts, FfmpegSink, FfmpegSinkOpts, FfmpegSource,
    FfmpegSourceOpts, FileDescriptor, FrameSource, Fps, LosslessCodec, Resolution,
    output::{encoded_path, stem_of},
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bytereel", version, about = "Store files as lossless video frames")]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a file into a lossless video (requires `ffmpeg` on PATH).
    Encode(EncodeArgs),
    /// Recover the original file from a video.
    Decode(DecodeArgs),
    /// Print the size and extension stored in a video's metadata frame.
    Inspect(InspectArgs),
    /// Dump one raw frame of a video as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path. Overrides --out-dir/--name.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output directory (defaults to the input's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output file name without extension (defaults to the input's stem).
    #[arg(long)]
    name: Option<String>,

    /// Frame size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1920x1080")]
    resolution: Resolution,

    /// Video frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// ffmpeg encoder threads (0 lets ffmpeg decide).
    #[arg(long)]
    threads: Option<u32>,

    /// Lossless codec.
    #[arg(long, value_enum, default_value_t = LosslessCodec::Png)]
    codec: LosslessCodec,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output file path. Overrides --out-dir.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output directory; the file is named after the video with the recovered extension.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Frame size as WIDTHxHEIGHT (defaults to the probed video size).
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame size as WIDTHxHEIGHT (defaults to the probed video size).
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0 is the metadata frame).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Frame size as WIDTHxHEIGHT (defaults to the probed video size).
    #[arg(long)]
    resolution: Option<Resolution>,
}

#[derive(serde::Serialize)]
struct InspectReport {
    #[serde(flatten)]
    descriptor: FileDescriptor,
    resolution: String,
    payload_frames: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parent_or_cwd(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolution_or_probe(path: &Path, res: Option<Resolution>) -> anyhow::Result<Resolution> {
    match res {
        Some(res) => Ok(res),
        None => bytereel::probe_resolution(path)
            .with_context(|| format!("probe resolution of '{}'", path.display())),
    }
}

fn open_source(path: &Path, res: Option<Resolution>) -> anyhow::Result<(FfmpegSource, Resolution)> {
    let resolution = resolution_or_probe(path, res)?;
    let source = FfmpegSource::open(FfmpegSourceOpts {
        in_path: path.to_path_buf(),
        resolution,
    })?;
    Ok((source, resolution))
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let out = match args.out {
        Some(out) => out,
        None => {
            let dir = args
                .out_dir
                .unwrap_or_else(|| parent_or_cwd(&args.in_path));
            let name = args.name.unwrap_or_else(|| stem_of(&args.in_path));
            encoded_path(&dir, &name)
        }
    };

    let opts = EncodeOpts {
        resolution: args.resolution,
        fps: Fps::new(args.fps, 1)?,
    };
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: out.clone(),
        overwrite: args.overwrite,
        codec: args.codec,
        threads: args.threads,
    });

    let stats = bytereel::encode_file(&args.in_path, &mut sink, &opts)
        .with_context(|| format!("encode '{}'", args.in_path.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} bytes)",
        out.display(),
        stats.frames,
        stats.payload_bytes
    );
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let target = match args.out {
        Some(out) => DecodeTarget::File(out),
        None => DecodeTarget::Dir {
            dir: args
                .out_dir
                .unwrap_or_else(|| parent_or_cwd(&args.in_path)),
            stem: stem_of(&args.in_path),
        },
    };

    let (mut source, resolution) = open_source(&args.in_path, args.resolution)?;
    let opts = DecodeOpts {
        resolution,
        overwrite: args.overwrite,
    };
    let decoded = bytereel::decode_to_file(&mut source, &target, &opts)
        .with_context(|| format!("decode '{}'", args.in_path.display()))?;

    eprintln!(
        "wrote {} ({} bytes)",
        decoded.path.display(),
        decoded.stats.bytes
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let (mut source, resolution) = open_source(&args.in_path, args.resolution)?;
    let descriptor = bytereel::read_descriptor(&mut source, resolution)
        .with_context(|| format!("inspect '{}'", args.in_path.display()))?;

    let report = InspectReport {
        payload_frames: descriptor.payload_frames(resolution),
        resolution: resolution.to_string(),
        descriptor,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("size:           {}", report.descriptor.file_size);
        println!("extension:      {}", report.descriptor.extension);
        println!("resolution:     {}", report.resolution);
        println!("payload frames: {}", report.payload_frames);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (mut source, _) = open_source(&args.in_path, args.resolution)?;

    let mut frame = None;
    for _ in 0..=args.index {
        frame = source.next_frame()?;
        if frame.is_none() {
            break;
        }
    }
    source.finish()?;
    let frame = frame.with_context(|| {
        format!(
            "'{}' has no frame {}",
            args.in_path.display(),
            args.index
        )
    })?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
