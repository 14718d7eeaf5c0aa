use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use slidereel::{CatalogOrder, RunRequest, RunState, TailHold, TransitionName};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a slideshow MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// List the media a render would use, in playback order.
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON run request. When given, the other flags are ignored.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory scanned recursively for images and videos.
    #[arg(long, required_unless_present = "config")]
    media_dir: Option<PathBuf>,

    /// Directory that receives the MP4.
    #[arg(long, required_unless_present = "config")]
    output_dir: Option<PathBuf>,

    /// Output file name.
    #[arg(long, default_value = "slideshow.mp4")]
    output_filename: String,

    /// Background music file.
    #[arg(long)]
    music: Option<PathBuf>,

    /// Output size, `WIDTHxHEIGHT`.
    #[arg(long, default_value = "1920x1080")]
    resolution: String,

    /// Seconds each image is shown.
    #[arg(long, default_value_t = 3.0)]
    image_duration: f64,

    /// Seconds spent on each transition.
    #[arg(long, default_value_t = 1.0)]
    transition_duration: f64,

    /// Music volume in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Randomize playback order.
    #[arg(long)]
    shuffle: bool,

    /// Enabled transition, repeatable (e.g. `--transition "Slide Left"`). Defaults to Fade.
    #[arg(long = "transition")]
    transitions: Vec<String>,

    #[arg(long, value_enum, default_value_t = OrderChoice::Traversal)]
    order: OrderChoice,

    /// Whether a slideshow ending on a video holds its last frame.
    #[arg(long, value_enum, default_value_t = TailChoice::Always)]
    tail_hold: TailChoice,

    /// Seed for shuffle and transition draws.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory to scan.
    dir: PathBuf,

    #[arg(long)]
    shuffle: bool,

    #[arg(long, value_enum, default_value_t = OrderChoice::Traversal)]
    order: OrderChoice,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderChoice {
    Traversal,
    Sorted,
}

impl From<OrderChoice> for CatalogOrder {
    fn from(v: OrderChoice) -> Self {
        match v {
            OrderChoice::Traversal => CatalogOrder::Traversal,
            OrderChoice::Sorted => CatalogOrder::Sorted,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TailChoice {
    Always,
    ImagesOnly,
}

impl From<TailChoice> for TailHold {
    fn from(v: TailChoice) -> Self {
        match v {
            TailChoice::Always => TailHold::Always,
            TailChoice::ImagesOnly => TailHold::ImagesOnly,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Scan(args) => cmd_scan(args),
    }
}

fn build_request(args: RenderArgs) -> anyhow::Result<RunRequest> {
    if let Some(path) = args.config.as_deref() {
        return Ok(RunRequest::from_json_path(path)?);
    }

    let transitions = if args.transitions.is_empty() {
        vec![TransitionName::Fade.as_str().to_string()]
    } else {
        args.transitions
    };

    Ok(RunRequest {
        media_dir: args.media_dir.context("--media-dir is required")?,
        music_file: args.music,
        output_dir: args.output_dir.context("--output-dir is required")?,
        output_filename: args.output_filename,
        resolution: args.resolution,
        image_duration: args.image_duration,
        transition_duration: args.transition_duration,
        audio_volume: args.volume,
        shuffle: args.shuffle,
        enabled_transitions: transitions,
        order: args.order.into(),
        tail_hold: args.tail_hold.into(),
        seed: args.seed,
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let req = build_request(args)?;
    let handle = slidereel::start_run(&req)?;

    for event in handle.events().iter() {
        match event.state {
            RunState::Running => eprintln!("[{:>3}%] {}", event.percent, event.message),
            RunState::Done => {
                eprintln!("[100%] {}", event.message);
                break;
            }
            RunState::Error => {
                eprintln!("error: {}", event.message);
                break;
            }
        }
    }

    let summary = handle.wait()?;
    println!(
        "{} ({} frames, {:.2}s, {} transitions, {} substituted)",
        summary.output_path.display(),
        summary.frames,
        summary.duration_secs,
        summary.transitions,
        summary.substituted
    );
    Ok(())
}

fn cmd_scan(args: ScanArgs) -> anyhow::Result<()> {
    let mut rng = slidereel::pipeline::worker::seeded_rng(args.seed);
    let catalog = slidereel::catalog::scan::scan(
        &args.dir,
        args.shuffle,
        args.order.into(),
        &mut rng,
    )
    .with_context(|| format!("scan '{}'", args.dir.display()))?;

    for item in catalog.items() {
        let kind = match item.kind {
            slidereel::MediaKind::Image => "image",
            slidereel::MediaKind::Video => "video",
        };
        println!("{kind}\t{}", item.path.display());
    }
    eprintln!("{} item(s)", catalog.len());
    Ok(())
}
