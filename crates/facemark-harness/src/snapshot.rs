//! Durable JSON snapshots of a run in progress.
//!
//! The intermediate snapshot is rewritten after every combination so a
//! crash loses at most the in-flight combination. Writes go through a
//! sibling `.tmp` file and a rename, so a failed write never corrupts the
//! previous snapshot.

use facemark_core::sysmon::SystemInfo;
use facemark_core::types::{BenchmarkRun, CombinationFailure, CombinationResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const INTERMEDIATE_FILE: &str = "intermediate_results.json";
pub const DETAILED_FILE: &str = "detailed_results.json";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct IntermediateDump<'a> {
    results: &'a [CombinationResult],
    failures: &'a [CombinationFailure],
    system: &'a SystemInfo,
}

#[derive(Serialize)]
struct BenchmarkInfo<'a> {
    timestamp: &'a str,
    total_combinations: usize,
    system: &'a SystemInfo,
}

#[derive(Serialize)]
struct DetailedDump<'a> {
    benchmark_info: BenchmarkInfo<'a>,
    results: &'a [CombinationResult],
    failures: &'a [CombinationFailure],
}

/// Overwrite `intermediate_results.json` with everything observed so far.
pub fn write_intermediate(run: &BenchmarkRun, output_dir: &Path) -> Result<(), SnapshotError> {
    let dump = IntermediateDump {
        results: &run.results,
        failures: &run.failures,
        system: &run.system,
    };
    write_atomic(&output_dir.join(INTERMEDIATE_FILE), &dump)
}

/// Write the archival `detailed_results.json`, including combinations
/// without metrics and the full failure log.
pub fn write_detailed(run: &BenchmarkRun, output_dir: &Path) -> Result<(), SnapshotError> {
    let dump = DetailedDump {
        benchmark_info: BenchmarkInfo {
            timestamp: &run.system.timestamp,
            total_combinations: run.results.len() + run.failures.len(),
            system: &run.system,
        },
        results: &run.results,
        failures: &run.failures,
    };
    write_atomic(&output_dir.join(DETAILED_FILE), &dump)
}

fn write_atomic<T: Serialize>(path: &Path, payload: &T) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(payload)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| SnapshotError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use facemark_core::backends::{DetectorBackend, RecognitionModel};
    use facemark_core::types::Combination;
    use tempfile::TempDir;

    fn sample_run() -> BenchmarkRun {
        let mut run = BenchmarkRun::new(SystemInfo::collect());
        let combination = Combination::new(DetectorBackend::OpenCv, RecognitionModel::SFace);
        run.results.push(CombinationResult::new(combination, 7));
        run.failures.push(CombinationFailure {
            detector: "opencv".to_string(),
            model: "NoSuchModel".to_string(),
            message: "unsupported recognition model: NoSuchModel".to_string(),
        });
        run
    }

    #[test]
    fn test_intermediate_snapshot_parses_back() {
        let dir = TempDir::new().unwrap();
        let run = sample_run();
        write_intermediate(&run, dir.path()).unwrap();

        let raw = fs::read_to_string(dir.path().join(INTERMEDIATE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["failures"].as_array().unwrap().len(), 1);
        assert!(value["system"]["cpu_count"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        write_intermediate(&sample_run(), dir.path()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_intermediate_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut run = sample_run();
        write_intermediate(&run, dir.path()).unwrap();

        let combination = Combination::new(DetectorBackend::YuNet, RecognitionModel::ArcFace);
        run.results.push(CombinationResult::new(combination, 7));
        write_intermediate(&run, dir.path()).unwrap();

        let raw = fs::read_to_string(dir.path().join(INTERMEDIATE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_detailed_dump_counts_failures() {
        let dir = TempDir::new().unwrap();
        let run = sample_run();
        write_detailed(&run, dir.path()).unwrap();

        let raw = fs::read_to_string(dir.path().join(DETAILED_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value["benchmark_info"]["total_combinations"].as_u64(),
            Some(2)
        );
        assert_eq!(
            value["benchmark_info"]["timestamp"].as_str(),
            Some(run.system.timestamp.as_str())
        );
    }
}
