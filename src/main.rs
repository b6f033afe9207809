//! smoothed-upscale CLI - enlarge an image with edge accentuation and smoothing.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smoothed_upscale::{Config, Pipeline};

/// Upscale an image by an integer factor, accentuate edges, then smooth and stretch contrast.
///
/// The result is written next to the input as `<stem>-<rows>x<cols>.png`.
#[derive(Parser, Debug)]
#[command(name = "smoothed-upscale")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Integer upscale factor applied to both dimensions.
    #[arg(value_name = "ALPHA", value_parser = clap::value_parser!(u32).range(1..))]
    alpha: u32,

    /// Look-ahead window of the edge-accentuation pass, in upscaled pixels.
    #[arg(value_name = "BETA", value_parser = clap::value_parser!(u32).range(1..))]
    beta: u32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("smoothed_upscale={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let config = Config {
        alpha: args.alpha as usize,
        beta: args.beta as usize,
        show_progress: true,
        ..Config::default()
    };

    let pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;

    let output = pipeline
        .process(&args.input)
        .context("Failed to upscale image")?;

    println!(
        "Successfully processed {} -> {}",
        args.input.display(),
        output.display()
    );

    Ok(())
}
