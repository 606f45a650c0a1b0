//! versim - Music version similarity
//!
//! Usage:
//!   versim <first_audio> <second_audio>       # Score one pair
//!   versim --directory <dir>                  # Rank every pair in a directory
//!   versim --config <path> ...                # Use a TOML configuration

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use versim_cli::output::{
    print_json_report, print_json_result, print_text_report, print_text_result,
};
use versim_core::{audio, compare_all, compare_files, SimilarityConfig};

#[derive(Parser, Debug)]
#[command(name = "versim")]
#[command(about = "Estimate how similar two versions of a musical piece are", long_about = None)]
struct Args {
    /// Compare every pair of audio files in this directory
    #[arg(short, long, conflicts_with_all = ["first", "second"])]
    directory: Option<PathBuf>,

    /// First audio file
    #[arg(required_unless_present = "directory", requires = "second")]
    first: Option<PathBuf>,

    /// Second audio file
    second: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs, so stdout only carries results
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {}", path.display());
            SimilarityConfig::load(path)?
        }
        None => SimilarityConfig::default(),
    };

    match (&args.directory, &args.first, &args.second) {
        (Some(dir), _, _) => run_directory(dir, &config, args.json),
        (None, Some(first), Some(second)) => run_pair(first, second, &config, args.json),
        _ => anyhow::bail!("Provide two audio files or --directory <dir>"),
    }
}

fn run_pair(first: &Path, second: &Path, config: &SimilarityConfig, json: bool) -> Result<()> {
    let start = std::time::Instant::now();
    let result = compare_files(first, second, config)?;
    log::info!("Compared in {:.2}s", start.elapsed().as_secs_f64());

    if json {
        print_json_result(&result);
    } else {
        print_text_result(&result);
    }
    Ok(())
}

fn run_directory(dir: &Path, config: &SimilarityConfig, json: bool) -> Result<()> {
    let load_start = std::time::Instant::now();
    let tracks = audio::load_directory(dir)?;
    log::info!(
        "Loaded {} tracks in {:.2}s",
        tracks.len(),
        load_start.elapsed().as_secs_f64()
    );

    let match_start = std::time::Instant::now();
    let report = compare_all(&tracks, config)?;
    log::info!(
        "Scored {} pairs in {:.2}s ({} tracks skipped)",
        report.results.len(),
        match_start.elapsed().as_secs_f64(),
        report.skipped.len()
    );

    if json {
        print_json_report(&report);
    } else {
        print_text_report(&report);
    }
    Ok(())
}
