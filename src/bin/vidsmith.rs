use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vidsmith::{Pipeline, PipelineConfig, SourceChain};

#[derive(Parser, Debug)]
#[command(name = "vidsmith", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a short video from a text prompt.
    Generate(GenerateArgs),
    /// Generate a single key image as a PNG, skipping the video stages.
    Image(ImageArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Text prompt describing the video.
    prompt: String,

    /// Pipeline config JSON; defaults apply when omitted.
    #[arg(long = "config")]
    config_path: Option<PathBuf>,

    /// Output directory for the artifact.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip remote image sources and synthesize everything locally.
    #[arg(long)]
    offline: bool,

    /// Mux a procedural soundtrack into the finished video.
    #[arg(long)]
    audio: bool,

    /// Fixed seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Text prompt describing the image.
    prompt: String,

    /// Output directory for the PNG.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip remote image sources and synthesize locally.
    #[arg(long)]
    offline: bool,

    /// Fixed seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Image(args) => cmd_image(args),
    }
}

fn read_config_json(path: &Path) -> anyhow::Result<PipelineConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let config: PipelineConfig =
        serde_json::from_reader(r).with_context(|| "parse config JSON")?;
    Ok(config)
}

fn make_chain(offline: bool) -> SourceChain {
    if offline {
        SourceChain::local_only()
    } else {
        SourceChain::default_chain()
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = match &args.config_path {
        Some(path) => read_config_json(path)?,
        None => PipelineConfig::default(),
    };
    config.out_dir = args.out_dir;
    if args.audio {
        config.mux_audio = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let pipeline = Pipeline::new(config, make_chain(args.offline));
    let artifact = pipeline.generate(&args.prompt)?;

    eprintln!(
        "wrote {} ({} frames, {} bytes, {:.1}s)",
        artifact.path.display(),
        artifact.frames_written,
        artifact.byte_size,
        artifact.elapsed.as_secs_f32(),
    );
    Ok(())
}

fn cmd_image(args: ImageArgs) -> anyhow::Result<()> {
    let config = PipelineConfig {
        out_dir: args.out_dir,
        seed: args.seed,
        ..PipelineConfig::default()
    };
    config.validate()?;

    let pipeline = Pipeline::new(config, make_chain(args.offline));
    let path = pipeline.save_key_image(&args.prompt)?;

    eprintln!("wrote {}", path.display());
    Ok(())
}
