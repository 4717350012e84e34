use crate::backends::{DetectorBackend, RecognitionModel};
use crate::sysmon::SystemInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A labeled test case: two image paths and their ground truth.
///
/// Immutable once built; only the pair builder creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    pub image_a: PathBuf,
    pub image_b: PathBuf,
    /// True when both images belong to the same identity.
    pub genuine: bool,
}

/// One detector/model configuration under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub detector: DetectorBackend,
    pub model: RecognitionModel,
}

impl Combination {
    pub fn new(detector: DetectorBackend, model: RecognitionModel) -> Self {
        Self { detector, model }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.detector, self.model)
    }
}

/// A pair whose verification call failed. The pair index refers to the
/// position in the combination's input pair list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairError {
    pub pair_index: usize,
    pub message: String,
}

/// Processing-time statistics over a combination's successful pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    pub mean_secs: f64,
    /// Population standard deviation.
    pub std_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
}

/// Memory-delta statistics over a combination's successful pairs.
///
/// Deltas are signed: a sample taken after an allocator release or a
/// concurrent process exit can come out negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub mean_mb: f64,
    pub max_mb: f64,
}

/// Confusion-matrix-derived metrics for one combination.
///
/// All four rates are in [0, 1] and fall back to 0 when their denominator
/// is 0; `tp + tn + fp + fn` equals the number of successful pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBlock {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub timing: TimingStats,
    pub memory: MemoryStats,
}

/// Everything observed while benchmarking one combination.
///
/// `successful_pairs + failed_pairs == total_pairs`; the four observation
/// vectors stay index-aligned and hold one entry per successful pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationResult {
    pub combination: Combination,
    pub total_pairs: usize,
    pub successful_pairs: usize,
    pub failed_pairs: usize,
    pub predictions: Vec<bool>,
    pub ground_truth: Vec<bool>,
    /// Seconds per successful verification call.
    pub processing_times: Vec<f64>,
    /// Whole-system used-memory delta per successful call, in MB.
    pub memory_deltas: Vec<f64>,
    pub errors: Vec<PairError>,
    /// Present iff at least one pair succeeded. `None` means "no data":
    /// reports exclude such combinations from ranking instead of treating
    /// them as zero-accuracy.
    pub metrics: Option<MetricsBlock>,
}

impl CombinationResult {
    /// Empty result for a combination about to be measured.
    pub fn new(combination: Combination, total_pairs: usize) -> Self {
        Self {
            combination,
            total_pairs,
            successful_pairs: 0,
            failed_pairs: 0,
            predictions: Vec::new(),
            ground_truth: Vec::new(),
            processing_times: Vec::new(),
            memory_deltas: Vec::new(),
            errors: Vec::new(),
            metrics: None,
        }
    }
}

/// A combination that never produced per-pair results, e.g. an unsupported
/// name or a backend that failed to initialize. Names stay as the caller's
/// strings so unsupported values remain representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationFailure {
    pub detector: String,
    pub model: String,
    pub message: String,
}

/// The full benchmark outcome handed to snapshotting and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub results: Vec<CombinationResult>,
    pub failures: Vec<CombinationFailure>,
    pub system: SystemInfo,
}

impl BenchmarkRun {
    pub fn new(system: SystemInfo) -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
            system,
        }
    }

    /// Results that carry a metrics block, in insertion order.
    pub fn scored_results(&self) -> impl Iterator<Item = (&CombinationResult, &MetricsBlock)> {
        self.results
            .iter()
            .filter_map(|r| r.metrics.as_ref().map(|m| (r, m)))
    }
}
