//! facemark-core — Face verification benchmark primitives.
//!
//! Builds labeled genuine/impostor image pairs from a directory of
//! per-identity photos, defines the external verification contract, and
//! reduces per-pair observations into confusion-matrix metrics.

pub mod backends;
pub mod metrics;
pub mod pairs;
pub mod sysmon;
pub mod types;
pub mod verify;

pub use backends::{DetectorBackend, RecognitionModel, Suite};
pub use pairs::PairSet;
pub use sysmon::{MemorySampler, SystemInfo};
pub use types::{BenchmarkRun, Combination, CombinationResult, ImagePair, MetricsBlock};
pub use verify::{Verification, Verifier};
