use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use platetrack::config::Config;
use platetrack::pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-vehicle plate annotation timelines from detector output", long_about = None)]
struct Args {
    /// YAML configuration; defaults are used for anything it leaves out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Associate plates with vehicle tracks and write the sparse table
    Collect {
        #[arg(short, long)]
        detections: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fill every track's frame range and write the dense table
    Interpolate {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Pick the best plate reading per track
    Labels {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// All stages with the configured paths
    Run,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = &config.paths;

    match args.command {
        Command::Collect { detections, output } => {
            let detections = detections.unwrap_or_else(|| paths.detections.clone());
            let output = output.unwrap_or_else(|| paths.sparse.clone());

            let table = pipeline::collect_path(&detections, &output)
                .with_context(|| format!("collecting {}", detections.display()))?;

            info!(
                "{} frames, {} tracks, {} readings -> {}",
                table.records().len(),
                table.track_count(),
                table.len(),
                output.display()
            );
        }
        Command::Interpolate {
            input,
            output,
            threads,
        } => {
            let input = input.unwrap_or_else(|| paths.sparse.clone());
            let output = output.unwrap_or_else(|| paths.dense.clone());
            let threads = threads.unwrap_or(config.interpolation.threads);

            let rows = pipeline::interpolate_path(&input, &output, threads)
                .with_context(|| format!("interpolating {}", input.display()))?;

            info!("{} dense rows -> {}", rows.len(), output.display());
        }
        Command::Labels { input, output } => {
            let input = input.unwrap_or_else(|| paths.dense.clone());

            let labels = pipeline::labels_path(&input)
                .with_context(|| format!("reading {}", input.display()))?;

            match output {
                Some(path) => pipeline::write_labels_path(&path, &labels)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => pipeline::write_labels(io::stdout().lock(), &labels)?,
            }
        }
        Command::Run => {
            let summary = pipeline::run(&config)?;

            println!(
                "frames={} tracks={} sparse_rows={} dense_rows={} labels={}",
                summary.frames,
                summary.tracks,
                summary.sparse_rows,
                summary.dense_rows,
                summary.labels
            );
        }
    }

    Ok(())
}
