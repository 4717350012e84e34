//! Test-pair construction from a directory-of-identities layout.
//!
//! Expected structure:
//!
//! ```text
//! test_data_dir/
//! ├── person1/
//! │   ├── img1.jpg
//! │   └── img2.jpg
//! └── person2/
//!     └── img1.png
//! ```
//!
//! Every unordered image pair within an identity becomes a genuine pair;
//! every unordered identity pair contributes exactly one impostor pair
//! built from each identity's first image. Directories and files are
//! enumerated in lexicographic name order so pair construction is
//! deterministic across platforms.

use crate::types::ImagePair;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Accepted image extensions, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

#[derive(Error, Debug)]
pub enum PairSetError {
    #[error("test data directory not found or not a directory: {0}")]
    InvalidTestDir(PathBuf),
    #[error("need at least 2 identity directories for benchmarking, found {0}")]
    TooFewIdentities(usize),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Genuine and impostor pairs built from one test-data directory.
#[derive(Debug, Clone)]
pub struct PairSet {
    pub genuine: Vec<ImagePair>,
    pub impostor: Vec<ImagePair>,
}

impl PairSet {
    /// All pairs, genuine first, in construction order.
    pub fn all(&self) -> Vec<ImagePair> {
        self.genuine
            .iter()
            .chain(self.impostor.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.genuine.len() + self.impostor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genuine.is_empty() && self.impostor.is_empty()
    }
}

/// Scan `test_data_dir` and derive labeled pairs.
///
/// Fails when the directory is missing or holds fewer than two identity
/// subdirectories. Identities with a single image produce no genuine pairs;
/// identities with no images are skipped for impostor pairing.
pub fn build_pairs(test_data_dir: &Path) -> Result<PairSet, PairSetError> {
    if !test_data_dir.is_dir() {
        return Err(PairSetError::InvalidTestDir(test_data_dir.to_path_buf()));
    }

    let identity_dirs = sorted_subdirs(test_data_dir)?;
    if identity_dirs.len() < 2 {
        return Err(PairSetError::TooFewIdentities(identity_dirs.len()));
    }

    let mut images_per_identity = Vec::with_capacity(identity_dirs.len());
    for dir in &identity_dirs {
        images_per_identity.push(sorted_images(dir)?);
    }

    // Genuine pairs: all C(k, 2) combinations within an identity. Exhaustive
    // by design; identities with many images dominate the genuine set.
    let mut genuine = Vec::new();
    for images in &images_per_identity {
        for (i, image_a) in images.iter().enumerate() {
            for image_b in &images[i + 1..] {
                genuine.push(ImagePair {
                    image_a: image_a.clone(),
                    image_b: image_b.clone(),
                    genuine: true,
                });
            }
        }
    }

    // Impostor pairs: one representative pair per identity pair, first image
    // of each, to bound the impostor set at C(n, 2).
    let mut impostor = Vec::new();
    for (i, images_a) in images_per_identity.iter().enumerate() {
        let Some(first_a) = images_a.first() else {
            continue;
        };
        for images_b in &images_per_identity[i + 1..] {
            let Some(first_b) = images_b.first() else {
                continue;
            };
            impostor.push(ImagePair {
                image_a: first_a.clone(),
                image_b: first_b.clone(),
                genuine: false,
            });
        }
    }

    tracing::info!(
        identities = identity_dirs.len(),
        genuine = genuine.len(),
        impostor = impostor.len(),
        "test pairs prepared"
    );

    Ok(PairSet { genuine, impostor })
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, PairSetError> {
    let entries = fs::read_dir(dir).map_err(|source| PairSetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PairSetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

fn sorted_images(dir: &Path) -> Result<Vec<PathBuf>, PairSetError> {
    let entries = fs::read_dir(dir).map_err(|source| PairSetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PairSetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    /// Build a test tree: one subdirectory per identity, one empty file per
    /// image name.
    fn fixture(identities: &[(&str, &[&str])]) -> TempDir {
        let root = TempDir::new().unwrap();
        for (identity, images) in identities {
            let dir = root.path().join(identity);
            fs::create_dir(&dir).unwrap();
            for image in *images {
                fs::write(dir.join(image), b"").unwrap();
            }
        }
        root
    }

    #[test]
    fn test_genuine_pairs_are_all_combinations() {
        // 4 images -> C(4, 2) = 6 genuine pairs
        let root = fixture(&[
            ("alice", &["a.jpg", "b.jpg", "c.jpg", "d.jpg"]),
            ("bob", &["a.jpg"]),
        ]);
        let pairs = build_pairs(root.path()).unwrap();

        assert_eq!(pairs.genuine.len(), 6);
        assert!(pairs.genuine.iter().all(|p| p.genuine));

        // All unordered combinations must be distinct.
        let distinct: HashSet<_> = pairs
            .genuine
            .iter()
            .map(|p| (p.image_a.clone(), p.image_b.clone()))
            .collect();
        assert_eq!(distinct.len(), 6);
    }

    #[test]
    fn test_impostor_pairs_one_per_identity_pair() {
        // 4 identities -> C(4, 2) = 6 impostor pairs
        let root = fixture(&[
            ("a", &["1.jpg", "2.jpg"]),
            ("b", &["1.jpg"]),
            ("c", &["1.jpg"]),
            ("d", &["1.jpg"]),
        ]);
        let pairs = build_pairs(root.path()).unwrap();

        assert_eq!(pairs.impostor.len(), 6);
        assert!(pairs.impostor.iter().all(|p| !p.genuine));
    }

    #[test]
    fn test_impostor_uses_first_image_in_sorted_order() {
        let root = fixture(&[
            ("alice", &["zz.jpg", "aa.jpg"]),
            ("bob", &["mid.png", "later.png"]),
        ]);
        let pairs = build_pairs(root.path()).unwrap();

        assert_eq!(pairs.impostor.len(), 1);
        let pair = &pairs.impostor[0];
        assert!(pair.image_a.ends_with("alice/aa.jpg"));
        assert!(pair.image_b.ends_with("bob/later.png"));
    }

    #[test]
    fn test_rejects_fewer_than_two_identities() {
        let root = fixture(&[("only", &["a.jpg", "b.jpg"])]);
        let err = build_pairs(root.path()).unwrap_err();
        assert!(matches!(err, PairSetError::TooFewIdentities(1)));
    }

    #[test]
    fn test_rejects_missing_directory() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope");
        let err = build_pairs(&missing).unwrap_err();
        assert!(matches!(err, PairSetError::InvalidTestDir(_)));
    }

    #[test]
    fn test_single_image_identities_yield_no_genuine_pairs() {
        let root = fixture(&[("a", &["1.jpg"]), ("b", &["1.jpg"])]);
        let pairs = build_pairs(root.path()).unwrap();
        assert!(pairs.genuine.is_empty());
        assert_eq!(pairs.impostor.len(), 1);
    }

    #[test]
    fn test_empty_identity_skipped_for_impostors() {
        let root = fixture(&[("a", &["1.jpg"]), ("b", &[]), ("c", &["1.jpg"])]);
        let pairs = build_pairs(root.path()).unwrap();
        // Only a-c can form an impostor pair.
        assert_eq!(pairs.impostor.len(), 1);
    }

    #[test]
    fn test_non_image_files_ignored() {
        let root = fixture(&[
            ("a", &["1.jpg", "notes.txt", "meta.json"]),
            ("b", &["1.PNG", "2.JPG"]),
        ]);
        let pairs = build_pairs(root.path()).unwrap();
        // Uppercase extensions count, text files do not.
        assert_eq!(pairs.genuine.len(), 1);
        assert_eq!(pairs.impostor.len(), 1);
    }

    #[test]
    fn test_order_is_deterministic() {
        let root = fixture(&[
            ("zoe", &["b.jpg", "a.jpg"]),
            ("amy", &["d.jpg", "c.jpg"]),
        ]);
        let first = build_pairs(root.path()).unwrap();
        let second = build_pairs(root.path()).unwrap();
        assert_eq!(first.all(), second.all());
        // Identities visited in lexicographic order: amy before zoe.
        assert!(first.genuine[0].image_a.ends_with("amy/c.jpg"));
    }
}
