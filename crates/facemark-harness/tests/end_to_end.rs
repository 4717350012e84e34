//! Full-pipeline test: directory tree in, artifact set out.

use facemark_core::types::Combination;
use facemark_core::verify::{Verification, Verifier, VerifyError};
use facemark_harness::{BenchmarkOrchestrator, RunContext};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Stub capability: verified=true exactly when both paths live under the
/// same identity directory.
struct IdentityPrefixVerifier;

impl Verifier for IdentityPrefixVerifier {
    fn verify(
        &mut self,
        image_a: &Path,
        image_b: &Path,
        _combination: &Combination,
    ) -> Result<Verification, VerifyError> {
        let matched = image_a.parent() == image_b.parent();
        Ok(Verification {
            verified: matched,
            distance: if matched { 0.25 } else { 0.85 },
        })
    }
}

fn identity_tree(identities: &[(&str, usize)]) -> TempDir {
    let root = TempDir::new().unwrap();
    for (name, count) in identities {
        let dir = root.path().join(name);
        fs::create_dir(&dir).unwrap();
        for i in 0..*count {
            fs::write(dir.join(format!("img{i}.jpg")), b"").unwrap();
        }
    }
    root
}

#[test]
fn perfect_stub_yields_full_accuracy_and_all_artifacts() {
    let tree = identity_tree(&[("ana", 2), ("ben", 2)]);
    let out = TempDir::new().unwrap();
    let context = RunContext::new(out.path()).unwrap();
    let mut verifier = IdentityPrefixVerifier;

    let run = BenchmarkOrchestrator::new(&context, &mut verifier)
        .run(
            &["opencv".to_string()],
            &["VGG-Face".to_string()],
            tree.path(),
        )
        .unwrap();

    // 2 identities × 2 images: C(2,2)=1 genuine pair each, 1 impostor pair.
    assert_eq!(run.results.len(), 1);
    let result = &run.results[0];
    assert_eq!(result.total_pairs, 3);
    assert_eq!(result.successful_pairs, 3);
    assert_eq!(result.failed_pairs, 0);

    let metrics = result.metrics.as_ref().unwrap();
    assert!((metrics.accuracy - 1.0).abs() < 1e-9);
    assert_eq!(
        metrics.true_positives + metrics.true_negatives,
        result.successful_pairs
    );

    for artifact in [
        "intermediate_results.json",
        "detailed_results.json",
        "benchmark_summary.csv",
        "benchmark_visualizations.svg",
        "benchmark_report.md",
    ] {
        assert!(
            out.path().join(artifact).exists(),
            "missing artifact: {artifact}"
        );
    }

    let csv = fs::read_to_string(out.path().join("benchmark_summary.csv")).unwrap();
    assert!(csv.lines().count() == 2);
    assert!(csv.contains("opencv"));

    let report = fs::read_to_string(out.path().join("benchmark_report.md")).unwrap();
    assert!(report.contains("opencv + VGG-Face"));
}

#[test]
fn mixed_grid_ranks_and_records_everything() {
    let tree = identity_tree(&[("ana", 3), ("ben", 2), ("cyn", 1)]);
    let out = TempDir::new().unwrap();
    let context = RunContext::new(out.path()).unwrap();
    let mut verifier = IdentityPrefixVerifier;

    let run = BenchmarkOrchestrator::new(&context, &mut verifier)
        .run(
            &["opencv".to_string(), "mtcnn".to_string()],
            &["Facenet".to_string(), "NotAModel".to_string()],
            tree.path(),
        )
        .unwrap();

    // Valid combinations score, the two NotAModel ones land in failures.
    assert_eq!(run.results.len(), 2);
    assert_eq!(run.failures.len(), 2);
    assert!(run
        .failures
        .iter()
        .all(|f| f.model == "NotAModel" && f.message.contains("unsupported")));

    // ana: C(3,2)=3 genuine, ben: 1 genuine, impostors: C(3,2)=3.
    assert!(run.results.iter().all(|r| r.total_pairs == 7));

    let detailed = fs::read_to_string(out.path().join("detailed_results.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&detailed).unwrap();
    assert_eq!(
        value["benchmark_info"]["total_combinations"].as_u64(),
        Some(4)
    );
    assert_eq!(value["failures"].as_array().unwrap().len(), 2);
}
