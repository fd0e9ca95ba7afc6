//! gramcv: given a set of kernel matrix archives that all belong to the
//! same dataset, select and evaluate classifiers via nested
//! cross-validation, reporting the best results per kernel.

mod cli;
mod io;

use anyhow::{Context, Result};
use clap::Parser;
use gramcv::{Driver, DriverConfig, KernelMatrixCollection};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(max_iterations = cli.max_iterations, "using iteration cap");

    if cli.output.exists() && !cli.force {
        tracing::info!(
            output = %cli.output.display(),
            "refusing to overwrite output file unless --force is given"
        );
        return Ok(());
    }

    tracing::info!("loading input data");
    let progress = ProgressBar::new(cli.matrices.len() as u64).with_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .context("invalid progress template")?,
    );
    progress.set_message("archives");

    let mut collections: BTreeMap<String, KernelMatrixCollection> = BTreeMap::new();
    for path in &cli.matrices {
        let collection = io::load_archive(path)?;
        collections.insert(collection.kernel_name().to_string(), collection);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let config = DriverConfig {
        name: cli.name.clone(),
        n_iterations: cli.iterations,
        n_folds: cli.folds,
        inner_folds: cli.inner_folds,
        max_iterations: cli.max_iterations,
        base_seed: cli.seed,
        with_indices: cli.with_indices,
        ..DriverConfig::default()
    };

    let report = Driver::new(config)
        .run(&collections)
        .context("evaluation failed")?;

    let file = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    tracing::info!(
        output = %cli.output.display(),
        runtime = report.runtime,
        "report written"
    );
    Ok(())
}
