//! Console and JSON output formatting

use serde::Serialize;
use versim_core::{BatchReport, PairScore, SkipReason, SkippedTrack};

#[derive(Serialize)]
struct BatchOutput<'a> {
    pairs: usize,
    results: &'a [PairScore],
    skipped: &'a [SkippedTrack],
}

/// One line per pair, in the order given
pub fn format_pair(result: &PairScore) -> String {
    format!(
        "{} and {} have a similarity score of {}",
        result.name_a, result.name_b, result.score
    )
}

pub fn format_skipped(skipped: &SkippedTrack) -> String {
    match &skipped.reason {
        SkipReason::RateMismatch {
            sample_rate,
            reference_rate,
        } => format!(
            "{} does not have the same sample frequency ({} Hz, expected {} Hz)",
            skipped.name, sample_rate, reference_rate
        ),
        SkipReason::EmptyFingerprint => format!("{} has no audible content", skipped.name),
    }
}

/// Print a single pair as text
pub fn print_text_result(result: &PairScore) {
    println!("{}", format_pair(result));
}

/// Print a single pair as JSON
pub fn print_json_result(result: &PairScore) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }
}

/// Print a batch as text; skipped tracks go to stderr
pub fn print_text_report(report: &BatchReport) {
    for skipped in &report.skipped {
        eprintln!("{}", format_skipped(skipped));
    }
    for result in &report.results {
        println!("{}", format_pair(result));
    }
}

/// Print a batch as JSON with a pair count
pub fn print_json_report(report: &BatchReport) {
    let output = BatchOutput {
        pairs: report.results.len(),
        results: &report.results,
        skipped: &report.skipped,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}
