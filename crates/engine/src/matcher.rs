//! Generic filesystem signal scoring.

use std::collections::BTreeSet;
use std::path::Path;

use glide_go_core::{DetectionPatterns, GlideError, MAX_CONFIDENCE, Result};
use tokio::fs;
use tracing::debug;

/// Depth of the extension walk: the root plus its immediate subdirectories.
/// Every detector uses the same depth.
pub const SCAN_DEPTH: usize = 2;

/// Confidence granted once every required file is present.
pub const BASE_CONFIDENCE: u8 = 50;

/// Confidence added per supporting signal.
pub const SIGNAL_BOOST: u8 = 10;

/// Number of matching source files that earns a second boost.
const PREVALENT_FILES: usize = 5;

/// Outcome of scoring a project root against detection patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    /// All required files are present.
    pub detected: bool,

    /// Confidence in `[0, 100]`.
    pub confidence: u8,

    /// Signals that contributed to the score.
    pub signals: BTreeSet<String>,
}

impl Evidence {
    fn not_detected() -> Self {
        Self::default()
    }

    fn boost(&mut self) {
        self.confidence = self
            .confidence
            .saturating_add(SIGNAL_BOOST)
            .min(MAX_CONFIDENCE);
    }

    fn record(&mut self, signal: impl Into<String>) {
        self.signals.insert(signal.into());
        self.boost();
    }
}

/// Scores `root` against `patterns`.
///
/// Missing required files short-circuit to a non-detection before anything
/// else is read. Only a failure to list the root itself is an error.
pub async fn match_patterns(root: &Path, patterns: &DetectionPatterns) -> Result<Evidence> {
    let mut signals = BTreeSet::new();

    for required in &patterns.required_files {
        if !exists(&root.join(required)).await {
            debug!("Required file {} missing in {}", required, root.display());
            return Ok(Evidence::not_detected());
        }
        signals.insert(required.clone());
    }

    let mut evidence = Evidence {
        detected: true,
        confidence: BASE_CONFIDENCE,
        signals,
    };

    for file in &patterns.optional_files {
        if exists(&root.join(file)).await {
            evidence.record(file.clone());
        }
    }

    for dir in &patterns.directories {
        if is_dir(&root.join(dir)).await {
            evidence.record(format!("{}/", dir));
        }
    }

    if !patterns.extensions.is_empty() {
        let count = count_matching_files(root, &patterns.extensions).await?;
        if count >= 1 {
            evidence.record(format!("{} source files", count));
        }
        if count >= PREVALENT_FILES {
            evidence.boost();
        }
    }

    Ok(evidence)
}

/// Counts regular files with a listed extension, walking [`SCAN_DEPTH`]
/// levels without following symlinks.
pub async fn count_matching_files(root: &Path, extensions: &[String]) -> Result<usize> {
    let mut pending = vec![(root.to_path_buf(), 1)];
    let mut count = 0;

    while let Some((dir, depth)) = pending.pop() {
        let is_root = depth == 1;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(source) if is_root => {
                return Err(GlideError::Filesystem {
                    path: dir.clone(),
                    source,
                });
            }
            Err(e) => {
                debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) if is_root => {
                    return Err(GlideError::Filesystem {
                        path: dir.clone(),
                        source,
                    });
                }
                Err(e) => {
                    debug!("Stopped listing {}: {}", dir.display(), e);
                    break;
                }
            };

            let Ok(file_type) = entry.file_type().await else {
                continue;
            };

            let path = entry.path();
            if file_type.is_dir() && depth < SCAN_DEPTH {
                pending.push((path, depth + 1));
            } else if file_type.is_file() && has_extension(&path, extensions) {
                count += 1;
            }
        }
    }

    Ok(count)
}

/// Returns true when the path's extension is listed (with or without the
/// leading dot).
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };

    extensions
        .iter()
        .any(|candidate| candidate.trim_start_matches('.') == ext)
}

/// Stat failures of any kind count as absent.
async fn exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::tempdir;

    fn go_patterns() -> DetectionPatterns {
        DetectionPatterns::new(vec!["go.mod".to_string()])
            .with_optional_files(vec!["go.sum".to_string(), "go.work".to_string()])
            .with_directories(vec!["vendor".to_string()])
            .with_extensions(vec![".go".to_string()])
    }

    #[tokio::test]
    async fn test_missing_required_file() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("package.json"), "{}").unwrap();
        stdfs::write(dir.path().join("main.go"), "package main").unwrap();

        let evidence = match_patterns(dir.path(), &go_patterns()).await.unwrap();
        assert_eq!(evidence, Evidence::not_detected());
    }

    #[tokio::test]
    async fn test_missing_root_is_not_detected() {
        let dir = tempdir().unwrap();
        let evidence = match_patterns(&dir.path().join("nope"), &go_patterns())
            .await
            .unwrap();
        assert!(!evidence.detected);
    }

    #[tokio::test]
    async fn test_base_confidence() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("go.mod"), "module x").unwrap();

        let evidence = match_patterns(dir.path(), &go_patterns()).await.unwrap();
        assert!(evidence.detected);
        assert_eq!(evidence.confidence, 50);
        assert!(evidence.signals.contains("go.mod"));
    }

    #[tokio::test]
    async fn test_optional_signals_add_up() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("go.mod"), "module x").unwrap();
        stdfs::write(dir.path().join("go.sum"), "").unwrap();
        stdfs::write(dir.path().join("go.work"), "go 1.24").unwrap();
        stdfs::create_dir(dir.path().join("vendor")).unwrap();

        let evidence = match_patterns(dir.path(), &go_patterns()).await.unwrap();
        assert_eq!(evidence.confidence, 80);
        assert!(evidence.signals.contains("vendor/"));
    }

    #[tokio::test]
    async fn test_directory_signal_requires_directory() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("go.mod"), "module x").unwrap();
        stdfs::write(dir.path().join("vendor"), "not a dir").unwrap();

        let evidence = match_patterns(dir.path(), &go_patterns()).await.unwrap();
        assert_eq!(evidence.confidence, 50);
    }

    #[tokio::test]
    async fn test_extension_prevalence() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("go.mod"), "module x").unwrap();
        stdfs::write(dir.path().join("main.go"), "package main").unwrap();

        let evidence = match_patterns(dir.path(), &go_patterns()).await.unwrap();
        assert_eq!(evidence.confidence, 60);

        let pkg = dir.path().join("pkg");
        stdfs::create_dir(&pkg).unwrap();
        for i in 0..4 {
            stdfs::write(pkg.join(format!("f{}.go", i)), "package pkg").unwrap();
        }

        let evidence = match_patterns(dir.path(), &go_patterns()).await.unwrap();
        assert_eq!(evidence.confidence, 70);
        assert!(evidence.signals.contains("5 source files"));
    }

    #[tokio::test]
    async fn test_walk_stops_at_scan_depth() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a").join("b");
        stdfs::create_dir_all(&deep).unwrap();
        stdfs::write(deep.join("deep.go"), "package b").unwrap();
        stdfs::write(dir.path().join("a").join("shallow.go"), "package a").unwrap();

        let count = count_matching_files(dir.path(), &[".go".to_string()])
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_confidence_capped() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("go.mod"), "module x").unwrap();
        let patterns = DetectionPatterns::new(vec!["go.mod".to_string()])
            .with_optional_files((0..8).map(|i| format!("opt{}", i)).collect());
        for i in 0..8 {
            stdfs::write(dir.path().join(format!("opt{}", i)), "").unwrap();
        }

        let evidence = match_patterns(dir.path(), &patterns).await.unwrap();
        assert_eq!(evidence.confidence, 100);
    }

    #[tokio::test]
    async fn test_unlistable_root_is_filesystem_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain-file");
        stdfs::write(&file, "").unwrap();

        let err = count_matching_files(&file, &[".go".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "filesystem-error");
    }

    #[tokio::test]
    async fn test_adding_evidence_never_lowers_confidence() {
        let dir = tempdir().unwrap();
        stdfs::write(dir.path().join("go.mod"), "module x").unwrap();
        let mut last = match_patterns(dir.path(), &go_patterns())
            .await
            .unwrap()
            .confidence;

        stdfs::write(dir.path().join("go.sum"), "").unwrap();
        stdfs::create_dir(dir.path().join("vendor")).unwrap();
        stdfs::write(dir.path().join("main.go"), "package main").unwrap();
        stdfs::write(dir.path().join("go.work"), "").unwrap();

        for _ in 0..2 {
            let now = match_patterns(dir.path(), &go_patterns())
                .await
                .unwrap()
                .confidence;
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 90);
    }
}
