use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "herodo", version, about = "Ken Burns documentaries from stills and narration")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the segment plan as JSON.
    Plan(PlanArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the documentary as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON composer config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Integer frames per second.
    #[arg(long)]
    fps: Option<u32>,
    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
    /// Music gain relative to narration, in (0, 1].
    #[arg(long)]
    attenuation: Option<f32>,
    #[arg(long)]
    min_segment_secs: Option<f64>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Image files in rank order.
    #[arg(long = "image")]
    images: Vec<PathBuf>,
    /// Number of images, when no files are given.
    #[arg(long = "images", conflicts_with = "images")]
    image_count: Option<usize>,
    /// Narration duration in seconds.
    #[arg(long, conflicts_with_all = ["script", "narration"])]
    duration: Option<f64>,
    /// Narration text; duration is estimated from its word count.
    #[arg(long, conflicts_with = "narration")]
    script: Option<PathBuf>,
    /// Narration audio; duration is measured with `ffmpeg`.
    #[arg(long)]
    narration: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Source image.
    #[arg(long)]
    image: PathBuf,
    /// Frame index within the segment (0-based).
    #[arg(long)]
    frame: u64,
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
    /// Motion path, e.g. `zoom-in-center`.
    #[arg(long, default_value = "zoom-in-center")]
    motion: herodo::MotionPath,
    /// Segment duration in seconds.
    #[arg(long, default_value_t = 3.0)]
    duration: f64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Image files in rank order.
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
    /// Narration audio; its duration is the video duration.
    #[arg(long)]
    narration: PathBuf,
    /// Optional background music.
    #[arg(long)]
    music: Option<PathBuf>,
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,
    /// x264 preset.
    #[arg(long, default_value = "medium")]
    preset: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(args: &CommonArgs) -> anyhow::Result<herodo::ComposerConfig> {
    let mut cfg = match &args.config {
        Some(path) => herodo::ComposerConfig::from_path(path)?,
        None => herodo::ComposerConfig::default(),
    };
    if let Some(w) = args.width {
        cfg.canvas.width = w;
    }
    if let Some(h) = args.height {
        cfg.canvas.height = h;
    }
    if let Some(fps) = args.fps {
        cfg.fps = herodo::Fps::integer(fps)?;
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }
    if let Some(a) = args.attenuation {
        cfg.attenuation = a;
    }
    if let Some(m) = args.min_segment_secs {
        cfg.min_segment_secs = m;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let count = if args.images.is_empty() {
        args.image_count
            .context("pass --image files or --images <count>")?
    } else {
        args.images.len()
    };

    let total_secs = match (args.duration, &args.script, &args.narration) {
        (Some(secs), _, _) => secs,
        (None, Some(script), _) => {
            let text = std::fs::read_to_string(script)
                .with_context(|| format!("read script '{}'", script.display()))?;
            herodo::estimate_narration_secs(&text)
        }
        (None, None, Some(narration)) => {
            herodo::decode_audio(narration, herodo::MIX_SAMPLE_RATE)?.duration_secs()
        }
        (None, None, None) => anyhow::bail!("pass --duration, --script or --narration"),
    };

    let plan = herodo::allocate_count(count, total_secs, &cfg)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let image = herodo::load_image(&args.image)?;
    let normalized = herodo::normalize(&image, cfg.canvas)?;

    let animator = herodo::KenBurnsAnimator::from_config(&cfg);
    let seq = animator.render(&normalized.image, args.duration, args.motion, cfg.fps)?;
    let frame = seq.frame(herodo::FrameIndex(args.frame))?;

    ensure_parent(&args.out)?;
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

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let images = args
        .images
        .iter()
        .map(|p| herodo::load_image(p))
        .collect::<Result<Vec<_>, _>>()?;
    let narration = herodo::decode_audio(&args.narration, herodo::MIX_SAMPLE_RATE)?;
    let music = args
        .music
        .as_deref()
        .map(|p| herodo::decode_audio(p, herodo::MIX_SAMPLE_RATE))
        .transpose()?;

    let inputs = herodo::DocumentaryInputs {
        images,
        narration,
        music,
    };
    let opts = herodo::FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: args.overwrite,
        preset: args.preset,
    };
    let asset = herodo::render_documentary(&inputs, &cfg, opts)?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        args.out.display(),
        asset.frames,
        asset.duration_secs
    );
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
