use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipweave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single composited frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline instant in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Blend clips source-over instead of drawing them destructively.
    #[arg(long)]
    source_over: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output audio sample rate in Hz.
    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    /// Blend clips source-over instead of drawing them destructively.
    #[arg(long)]
    source_over: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn composite_mode(source_over: bool) -> clipweave::CompositeMode {
    if source_over {
        clipweave::CompositeMode::SourceOver
    } else {
        clipweave::CompositeMode::Replace
    }
}

#[cfg(feature = "media-ffmpeg")]
fn make_decoder(sample_rate: u32) -> Box<dyn clipweave::MediaDecoder> {
    Box::new(clipweave::FfmpegDecoder::new(sample_rate))
}

#[cfg(not(feature = "media-ffmpeg"))]
fn make_decoder(_sample_rate: u32) -> Box<dyn clipweave::MediaDecoder> {
    Box::new(clipweave::StillImageDecoder)
}

fn open_session(
    in_path: &Path,
    opts: clipweave::RenderOpts,
) -> anyhow::Result<clipweave::RenderSession> {
    let project = clipweave::Project::from_path(in_path)
        .with_context(|| format!("load project '{}'", in_path.display()))?;
    let decoder = make_decoder(opts.sample_rate);
    let session = clipweave::RenderSession::new(
        project,
        decoder.as_ref(),
        opts,
        clipweave::TransitionRegistry::default(),
    )?;
    Ok(session)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let at = clipweave::duration_from_secs(args.at).context("--at")?;
    let opts = clipweave::RenderOpts {
        composite: composite_mode(args.source_over),
        ..clipweave::RenderOpts::default()
    };
    let mut session = open_session(&args.in_path, opts)?;
    let mut frame = session.render_frame_at(at)?;

    // PNG stores straight alpha.
    for px in frame.data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a != 0 && a != 255 {
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!(path = %args.out.display(), "wrote frame");
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = clipweave::RenderOpts {
        sample_rate: args.sample_rate,
        fps: clipweave::Fps::new(args.fps, 1)?,
        composite: composite_mode(args.source_over),
        ..clipweave::RenderOpts::default()
    };
    let mut session = open_session(&args.in_path, opts.clone())?;
    let project = session.project();

    let mut muxer = clipweave::FfmpegMuxer::new(clipweave::FfmpegMuxerOpts::new(&args.out));
    let mut audio = clipweave::PcmEncoder::new(opts.sample_rate, opts.audio_frame_size);
    let mut video = clipweave::RawVideoEncoder::new(
        project.width,
        project.height,
        opts.fps,
        clipweave::PixelLayout::Rgba8,
    );

    let mut last_logged = -1.0;
    let mut progress = |p: f64| {
        if p - last_logged >= 5.0 || p >= 100.0 {
            tracing::info!(progress = p, "rendering");
            last_logged = p;
        }
    };
    let output = clipweave::RenderOutput {
        muxer: &mut muxer,
        audio: &mut audio,
        video: &mut video,
    };
    let report = session.render(output, &mut progress, &clipweave::CancellationToken::new())?;

    tracing::info!(
        path = %args.out.display(),
        audio_blocks = report.audio_blocks,
        video_frames = report.video_frames,
        "wrote video"
    );
    Ok(())
}
