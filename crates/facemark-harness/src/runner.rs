//! Per-combination measurement loop.

use facemark_core::metrics::compute_metrics;
use facemark_core::sysmon::MemorySampler;
use facemark_core::types::{Combination, CombinationResult, ImagePair, PairError};
use facemark_core::verify::{Verifier, VerifyError};
use std::time::Instant;

/// Runs every test pair through a verifier for one combination, recording
/// timing, memory deltas and the verification outcome.
///
/// The loop is strictly sequential: verification calls are resource-heavy
/// blocking units, and memory samples must bracket a single call to mean
/// anything.
pub struct CombinationRunner {
    sampler: MemorySampler,
}

impl CombinationRunner {
    pub fn new() -> Self {
        Self {
            sampler: MemorySampler::new(),
        }
    }

    /// Measure one combination over the full pair list.
    ///
    /// Returns `Err` only when the backend cannot be prepared for this
    /// combination at all. A failing pair is recorded and skipped; it never
    /// aborts the remaining pairs.
    pub fn run<V: Verifier>(
        &mut self,
        verifier: &mut V,
        combination: Combination,
        pairs: &[ImagePair],
    ) -> Result<CombinationResult, VerifyError> {
        verifier.prepare(&combination)?;

        let mut result = CombinationResult::new(combination, pairs.len());

        for (index, pair) in pairs.iter().enumerate() {
            let memory_before = self.sampler.used_mb();
            let started = Instant::now();

            match verifier.verify(&pair.image_a, &pair.image_b, &combination) {
                Ok(verification) => {
                    let elapsed = started.elapsed().as_secs_f64();
                    let memory_after = self.sampler.used_mb();

                    result.successful_pairs += 1;
                    result.predictions.push(verification.verified);
                    result.ground_truth.push(pair.genuine);
                    result.processing_times.push(elapsed);
                    result.memory_deltas.push(memory_after - memory_before);

                    tracing::debug!(
                        pair = index + 1,
                        total = pairs.len(),
                        secs = elapsed,
                        "pair verified"
                    );
                }
                Err(err) => {
                    result.failed_pairs += 1;
                    result.errors.push(PairError {
                        pair_index: index,
                        message: err.to_string(),
                    });
                    tracing::warn!(
                        pair = index + 1,
                        total = pairs.len(),
                        error = %err,
                        "pair verification failed"
                    );
                }
            }
        }

        if result.successful_pairs > 0 {
            // Lengths are equal by construction; a mismatch here is a bug.
            match compute_metrics(
                &result.predictions,
                &result.ground_truth,
                &result.processing_times,
                &result.memory_deltas,
            ) {
                Ok(block) => result.metrics = Some(block),
                Err(err) => {
                    tracing::error!(combination = %combination, error = %err, "metrics computation failed");
                }
            }
        }

        Ok(result)
    }
}

impl Default for CombinationRunner {
    fn default() -> Self {
        Self::new()
    }
}
