//! Final report artifacts: CSV summary, JSON dump, figures and the
//! markdown narrative. Pure functions of a [`BenchmarkRun`]; nothing here
//! feeds back into the run.

use crate::figures;
use crate::snapshot::{self, SnapshotError};
use facemark_core::types::{BenchmarkRun, CombinationResult, MetricsBlock};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUMMARY_CSV_FILE: &str = "benchmark_summary.csv";
pub const REPORT_MD_FILE: &str = "benchmark_report.md";
pub const VISUALIZATIONS_FILE: &str = "benchmark_visualizations.png";

const CSV_HEADER: [&str; 19] = [
    "Detector",
    "Model",
    "Accuracy",
    "Precision",
    "Recall",
    "F1_Score",
    "True_Positives",
    "True_Negatives",
    "False_Positives",
    "False_Negatives",
    "Avg_Processing_Time_s",
    "Std_Processing_Time_s",
    "Min_Processing_Time_s",
    "Max_Processing_Time_s",
    "Avg_Memory_Usage_MB",
    "Max_Memory_Usage_MB",
    "Successful_Pairs",
    "Failed_Pairs",
    "Total_Pairs",
];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv summary failed: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("figure rendering failed: {0}")]
    Figures(String),
}

/// Write every report artifact into `output_dir`.
pub fn generate_reports(run: &BenchmarkRun, output_dir: &Path) -> Result<(), ReportError> {
    snapshot::write_detailed(run, output_dir)?;
    write_summary_csv(run, output_dir)?;
    figures::render_figures(run, &output_dir.join(VISUALIZATIONS_FILE))?;
    write_markdown_report(run, output_dir)?;
    tracing::info!(dir = %output_dir.display(), "reports generated");
    Ok(())
}

/// One row per scored combination; combinations without metrics are
/// excluded here but remain in the JSON dump.
pub fn write_summary_csv(run: &BenchmarkRun, output_dir: &Path) -> Result<(), ReportError> {
    let path = output_dir.join(SUMMARY_CSV_FILE);
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record(CSV_HEADER)?;

    for (result, metrics) in run.scored_results() {
        writer.write_record(&[
            result.combination.detector.as_str().to_string(),
            result.combination.model.as_str().to_string(),
            format!("{:.6}", metrics.accuracy),
            format!("{:.6}", metrics.precision),
            format!("{:.6}", metrics.recall),
            format!("{:.6}", metrics.f1),
            metrics.true_positives.to_string(),
            metrics.true_negatives.to_string(),
            metrics.false_positives.to_string(),
            metrics.false_negatives.to_string(),
            format!("{:.6}", metrics.timing.mean_secs),
            format!("{:.6}", metrics.timing.std_secs),
            format!("{:.6}", metrics.timing.min_secs),
            format!("{:.6}", metrics.timing.max_secs),
            format!("{:.3}", metrics.memory.mean_mb),
            format!("{:.3}", metrics.memory.max_mb),
            result.successful_pairs.to_string(),
            result.failed_pairs.to_string(),
            result.total_pairs.to_string(),
        ])?;
    }

    writer.flush().map_err(|source| ReportError::Io {
        path,
        source,
    })?;
    Ok(())
}

/// The human-facing narrative: executive summary, call-outs, full table,
/// failures. Uses the run's own timestamp so regeneration is idempotent.
pub fn write_markdown_report(run: &BenchmarkRun, output_dir: &Path) -> Result<(), ReportError> {
    let path = output_dir.join(REPORT_MD_FILE);
    fs::write(&path, render_markdown(run)).map_err(|source| ReportError::Io { path, source })
}

fn render_markdown(run: &BenchmarkRun) -> String {
    let scored: Vec<(&CombinationResult, &MetricsBlock)> = run.scored_results().collect();
    let total = run.results.len() + run.failures.len();
    let unscored = total - scored.len();

    let mut out = String::new();
    let _ = writeln!(out, "# Face Recognition Benchmark Report\n");

    let _ = writeln!(out, "## Executive Summary\n");
    let _ = writeln!(out, "- **Benchmark Date**: {}", run.system.timestamp);
    let _ = writeln!(out, "- **Total Combinations Tested**: {total}");
    let _ = writeln!(out, "- **Successful Tests**: {}", scored.len());
    let _ = writeln!(out, "- **Failed Tests**: {unscored}\n");

    let _ = writeln!(out, "## System Information\n");
    let _ = writeln!(out, "- **CPU Cores**: {}", run.system.cpu_count);
    let _ = writeln!(out, "- **Total Memory**: {} GB", run.system.total_memory_gb);
    let _ = writeln!(out, "- **OS**: {}", run.system.os);
    let _ = writeln!(
        out,
        "- **Harness Version**: {}\n",
        run.system.harness_version
    );

    if !scored.is_empty() {
        let best_accuracy = pick_best(&scored, |m| m.accuracy, true);
        let fastest = pick_best(&scored, |m| m.timing.mean_secs, false);
        let best_f1 = pick_best(&scored, |m| m.f1, true);

        let _ = writeln!(out, "## Top Performers\n");

        let _ = writeln!(out, "### Best Accuracy\n");
        let _ = writeln!(out, "- **Combination**: {}", best_accuracy.0.combination);
        let _ = writeln!(out, "- **Accuracy**: {:.4}", best_accuracy.1.accuracy);
        let _ = writeln!(
            out,
            "- **Processing Time**: {:.3}s\n",
            best_accuracy.1.timing.mean_secs
        );

        let _ = writeln!(out, "### Fastest Processing\n");
        let _ = writeln!(out, "- **Combination**: {}", fastest.0.combination);
        let _ = writeln!(
            out,
            "- **Processing Time**: {:.3}s",
            fastest.1.timing.mean_secs
        );
        let _ = writeln!(out, "- **Accuracy**: {:.4}\n", fastest.1.accuracy);

        let _ = writeln!(out, "### Best F1-Score\n");
        let _ = writeln!(out, "- **Combination**: {}", best_f1.0.combination);
        let _ = writeln!(out, "- **F1-Score**: {:.4}", best_f1.1.f1);
        let _ = writeln!(out, "- **Accuracy**: {:.4}\n", best_f1.1.accuracy);

        let _ = writeln!(out, "## Detailed Results\n");
        let _ = writeln!(
            out,
            "| Detector | Model | Accuracy | Precision | Recall | F1-Score | Avg Time (s) | Memory (MB) |"
        );
        let _ = writeln!(
            out,
            "|----------|-------|----------|-----------|--------|----------|--------------|-------------|"
        );

        let mut ranked = scored.clone();
        // Stable sort: equal accuracies keep iteration order.
        ranked.sort_by(|a, b| {
            b.1.accuracy
                .partial_cmp(&a.1.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (result, metrics) in &ranked {
            let _ = writeln!(
                out,
                "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.3} | {:.1} |",
                result.combination.detector,
                result.combination.model,
                metrics.accuracy,
                metrics.precision,
                metrics.recall,
                metrics.f1,
                metrics.timing.mean_secs,
                metrics.memory.mean_mb,
            );
        }
        let _ = writeln!(out);
    }

    if !run.failures.is_empty() {
        let _ = writeln!(out, "## Errors and Issues\n");
        let _ = writeln!(out, "The following combinations failed during testing:\n");
        for failure in &run.failures {
            let _ = writeln!(
                out,
                "- **{} + {}**: {}",
                failure.detector, failure.model, failure.message
            );
        }
        let _ = writeln!(out);
    }

    let metricless = run.results.iter().filter(|r| r.metrics.is_none()).count();
    if metricless > 0 {
        let _ = writeln!(
            out,
            "_{metricless} combination(s) produced no successful pairs and are \
             excluded from rankings; see `detailed_results.json`._\n"
        );
    }

    let _ = writeln!(out, "## Files Generated\n");
    let _ = writeln!(
        out,
        "- `{SUMMARY_CSV_FILE}`: tabular summary of all scored combinations"
    );
    let _ = writeln!(
        out,
        "- `{}`: complete benchmark data with all metrics and errors",
        snapshot::DETAILED_FILE
    );
    let _ = writeln!(
        out,
        "- `benchmark_visualizations.svg`: performance comparison charts"
    );
    let _ = writeln!(out, "- `{REPORT_MD_FILE}`: this report");

    out
}

/// First-encountered entry wins ties: the comparison is strict, so later
/// equal values never replace the current best.
fn pick_best<'a>(
    scored: &[(&'a CombinationResult, &'a MetricsBlock)],
    key: impl Fn(&MetricsBlock) -> f64,
    descending: bool,
) -> (&'a CombinationResult, &'a MetricsBlock) {
    let mut best = scored[0];
    for candidate in &scored[1..] {
        let better = if descending {
            key(candidate.1) > key(best.1)
        } else {
            key(candidate.1) < key(best.1)
        };
        if better {
            best = *candidate;
        }
    }
    best
}
