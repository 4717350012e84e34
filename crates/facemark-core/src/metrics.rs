//! Reduction of per-pair observations into a [`MetricsBlock`].

use crate::types::{MemoryStats, MetricsBlock, TimingStats};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metrics require at least one successful observation")]
    NoObservations,
    #[error(
        "observation sequences differ in length: predictions={predictions}, \
         ground_truth={ground_truth}, times={times}, memory={memory}"
    )]
    LengthMismatch {
        predictions: usize,
        ground_truth: usize,
        times: usize,
        memory: usize,
    },
}

/// Reduce parallel observation sequences into confusion counts, rates and
/// timing/memory statistics.
///
/// All four slices must have equal, non-zero length. Rates whose denominator
/// is 0 come out as 0 rather than NaN: the zero fallback is deliberate
/// policy, not an error condition.
pub fn compute_metrics(
    predictions: &[bool],
    ground_truth: &[bool],
    processing_times: &[f64],
    memory_deltas: &[f64],
) -> Result<MetricsBlock, MetricsError> {
    let n = predictions.len();
    if n != ground_truth.len() || n != processing_times.len() || n != memory_deltas.len() {
        return Err(MetricsError::LengthMismatch {
            predictions: n,
            ground_truth: ground_truth.len(),
            times: processing_times.len(),
            memory: memory_deltas.len(),
        });
    }
    if n == 0 {
        return Err(MetricsError::NoObservations);
    }

    let mut tp = 0usize;
    let mut tn = 0usize;
    let mut fp = 0usize;
    let mut fn_count = 0usize;
    for (&predicted, &actual) in predictions.iter().zip(ground_truth.iter()) {
        match (predicted, actual) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (true, false) => fp += 1,
            (false, true) => fn_count += 1,
        }
    }

    let accuracy = (tp + tn) as f64 / n as f64;
    let precision = ratio_or_zero(tp, tp + fp);
    let recall = ratio_or_zero(tp, tp + fn_count);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Ok(MetricsBlock {
        accuracy,
        precision,
        recall,
        f1,
        true_positives: tp,
        true_negatives: tn,
        false_positives: fp,
        false_negatives: fn_count,
        timing: timing_stats(processing_times),
        memory: memory_stats(memory_deltas),
    })
}

fn ratio_or_zero(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn timing_stats(times: &[f64]) -> TimingStats {
    let mean_secs = mean(times);
    // Population standard deviation: observations are the whole population
    // for this combination, not a sample from it.
    let variance = times
        .iter()
        .map(|t| (t - mean_secs).powi(2))
        .sum::<f64>()
        / times.len() as f64;

    TimingStats {
        mean_secs,
        std_secs: variance.sqrt(),
        min_secs: times.iter().copied().fold(f64::INFINITY, f64::min),
        max_secs: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

fn memory_stats(deltas: &[f64]) -> MemoryStats {
    MemoryStats {
        mean_mb: mean(deltas),
        max_mb: deltas.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
