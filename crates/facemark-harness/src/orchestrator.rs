//! Cross-product benchmark orchestration.

use crate::report::{self, ReportError};
use crate::runner::CombinationRunner;
use crate::snapshot;
use facemark_core::backends::{BackendParseError, DetectorBackend, RecognitionModel};
use facemark_core::pairs::{self, PairSetError};
use facemark_core::sysmon::SystemInfo;
use facemark_core::types::{BenchmarkRun, Combination, CombinationFailure};
use facemark_core::verify::Verifier;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Pairs(#[from] PairSetError),
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("benchmark interrupted by user")]
    Interrupted,
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Explicit per-run state: output location, the system fingerprint captured
/// once at startup, and the interrupt flag. Created before the run, passed
/// down, never reinitialized mid-run.
pub struct RunContext {
    output_dir: PathBuf,
    system: SystemInfo,
    interrupt: Arc<AtomicBool>,
}

impl RunContext {
    /// Create the output directory and capture the system fingerprint.
    pub fn new(output_dir: &Path) -> Result<Self, OrchestratorError> {
        std::fs::create_dir_all(output_dir).map_err(|source| OrchestratorError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            system: SystemInfo::collect(),
            interrupt: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn system(&self) -> &SystemInfo {
        &self.system
    }

    /// Shared flag for a signal handler to request a clean stop. Polled
    /// between combinations; an in-flight combination always finishes.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }
}

/// Drives the detector × model cross product over one fixed pair set.
pub struct BenchmarkOrchestrator<'a, V: Verifier> {
    context: &'a RunContext,
    verifier: &'a mut V,
}

impl<'a, V: Verifier> BenchmarkOrchestrator<'a, V> {
    pub fn new(context: &'a RunContext, verifier: &'a mut V) -> Self {
        Self { context, verifier }
    }

    /// Benchmark every requested detector/model combination.
    ///
    /// Detector and model names arrive as caller strings: unsupported names
    /// become failure-log entries for the affected combinations instead of
    /// aborting the run. Every combination sees the identical pair set.
    /// After each combination the intermediate snapshot is rewritten;
    /// report generation runs exactly once at the end.
    pub fn run(
        &mut self,
        detectors: &[String],
        models: &[String],
        test_data_dir: &Path,
    ) -> Result<BenchmarkRun, OrchestratorError> {
        let pair_set = pairs::build_pairs(test_data_dir)?;
        let test_pairs = pair_set.all();

        let mut run = BenchmarkRun::new(self.context.system.clone());
        let mut runner = CombinationRunner::new();

        let total = detectors.len() * models.len();
        let mut current = 0usize;

        for detector in detectors {
            for model in models {
                current += 1;
                if self.context.interrupted() {
                    tracing::warn!(
                        completed = current - 1,
                        total,
                        "interrupt requested, stopping before next combination"
                    );
                    return Err(OrchestratorError::Interrupted);
                }

                tracing::info!(detector = %detector, model = %model, current, total, "benchmarking combination");

                match parse_combination(detector, model) {
                    Ok(combination) => {
                        match runner.run(self.verifier, combination, &test_pairs) {
                            Ok(result) => run.results.push(result),
                            Err(err) => {
                                tracing::error!(
                                    detector = %detector,
                                    model = %model,
                                    error = %err,
                                    "combination failed entirely"
                                );
                                run.failures.push(CombinationFailure {
                                    detector: detector.clone(),
                                    model: model.clone(),
                                    message: err.to_string(),
                                });
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!(detector = %detector, model = %model, error = %err, "unsupported combination");
                        run.failures.push(CombinationFailure {
                            detector: detector.clone(),
                            model: model.clone(),
                            message: err.to_string(),
                        });
                    }
                }

                // Loud but non-fatal: a failed snapshot must not take the
                // benchmark down with it.
                if let Err(err) = snapshot::write_intermediate(&run, &self.context.output_dir) {
                    tracing::error!(error = %err, "failed to persist intermediate snapshot");
                }
            }
        }

        tracing::info!(
            scored = run.results.len(),
            failed = run.failures.len(),
            "benchmark complete, generating reports"
        );
        report::generate_reports(&run, &self.context.output_dir)?;

        Ok(run)
    }
}

fn parse_combination(detector: &str, model: &str) -> Result<Combination, BackendParseError> {
    let detector: DetectorBackend = detector.parse()?;
    let model: RecognitionModel = model.parse()?;
    Ok(Combination::new(detector, model))
}
