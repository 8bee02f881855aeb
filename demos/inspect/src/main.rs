// Inspect — load a directory of processed recordings and report what came out
//
// Builds a ProcessedDataset exactly as a training run would, then prints:
//   1. one line per archive: timesteps, channels, features, stored dtypes
//   2. the shape of every sample (or the first --limit of them)
//   3. the label range across the whole dataset
//   4. optionally, the batch shapes a DataLoader would produce
//
// Usage:
//   inspect data/physionet_processed/train --temporal-len 10 --mode train
//   inspect data/physionet_processed/test --mode eval --batch-size 1
//
// Logging goes through env_logger; set RUST_LOG=tidal_data=debug for a line
// per archive during loading.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::info;

use tidal_data::{DataLoader, DataLoaderConfig, Dataset, Mode, ProcessedConfig, ProcessedDataset};

#[derive(Parser)]
#[command(name = "inspect")]
#[command(about = "Load processed .npz recordings and report sample shapes")]
#[command(version)]
struct Cli {
    /// Directory holding the archives
    base_dir: PathBuf,

    /// Window length in timesteps
    #[arg(short, long, default_value_t = 10)]
    temporal_len: usize,

    /// "train" cuts windows; anything else keeps whole recordings
    #[arg(short, long, default_value = "train")]
    mode: String,

    /// Archive extension
    #[arg(long, default_value = "npz")]
    extension: String,

    /// Feature array name
    #[arg(long, default_value = "x")]
    x_key: String,

    /// Label array name
    #[arg(long, default_value = "y")]
    y_key: String,

    /// Normalization stabilizer
    #[arg(long, default_value_t = tidal_data::DEFAULT_EPSILON)]
    epsilon: f64,

    /// Print at most this many sample shapes
    #[arg(short, long)]
    limit: Option<usize>,

    /// Also run one unshuffled epoch through a DataLoader with this batch size
    #[arg(short, long)]
    batch_size: Option<usize>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ProcessedConfig::default()
        .temporal_len(cli.temporal_len)
        .mode(Mode::from(cli.mode.as_str()))
        .extension(cli.extension)
        .x_key(cli.x_key)
        .y_key(cli.y_key)
        .epsilon(cli.epsilon);

    let ds = ProcessedDataset::load(&cli.base_dir, config)
        .with_context(|| format!("loading {}", cli.base_dir.display()))?;

    println!("=== tidal — {} ({}) ===", cli.base_dir.display(), ds.mode());
    println!();

    println!("Archives ({}):", ds.archives().len());
    for a in ds.archives() {
        println!(
            "  {}  T={} C={} F={}  x:{} y:{}  -> {} sample(s)",
            a.path.display(),
            a.timesteps,
            a.channels,
            a.features,
            a.x_dtype,
            a.y_dtype,
            a.samples
        );
    }
    println!();

    let shown = cli.limit.unwrap_or(ds.len()).min(ds.len());
    println!("Samples ({} total, showing {}):", ds.len(), shown);
    for i in 0..shown {
        let sample = ds.get(i)?;
        println!("  [{i}] x {}  y {}", sample.x.shape(), sample.y.shape());
    }
    println!();

    match ds.label_range() {
        Some((lo, hi)) => println!("Label range: {lo} .. {hi}"),
        None => println!("Label range: (no labels)"),
    }

    if let Some(batch_size) = cli.batch_size {
        let loader_config = DataLoaderConfig::default()
            .batch_size(batch_size)
            .shuffle(false);
        let mut loader = DataLoader::new(&ds, loader_config)?;
        println!();
        println!("Batches ({}):", loader.num_batches());
        for (i, batch) in loader.iter_batches().enumerate() {
            let batch = batch.with_context(|| format!("collating batch {i}"))?;
            println!("  [{i}] x {}  y {}", batch.x.shape(), batch.y.shape());
        }
    }

    info!("done");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("tidal_data=info"))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
