//! Go project detection.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glide_go_core::{Config, DetectionPatterns, DetectionRecord, FrameworkInfo, Result, merge};
use tracing::debug;

use crate::catalogue::Catalogue;
use crate::matcher::{SIGNAL_BOOST, match_patterns};

/// The manifest whose presence marks a Go module.
pub const GO_MANIFEST: &str = "go.mod";

/// Marks a multi-module workspace root.
pub const WORKSPACE_MARKER: &str = "go.work";

/// Configuration files of common Go development tools.
pub const TOOL_MARKERS: [&str; 5] = [
    ".golangci.yml",
    ".golangci.yaml",
    ".goreleaser.yml",
    ".goreleaser.yaml",
    "Makefile",
];

/// Detects Go projects and assembles their metadata record.
///
/// Feature gates are written by the host's configure call before any
/// detection is dispatched, so they are plain atomics rather than a lock.
pub struct GoDetector {
    framework: FrameworkInfo,
    patterns: DetectionPatterns,
    catalogue: Arc<Catalogue>,
    enable_workspace: AtomicBool,
    enable_tools: AtomicBool,
}

impl GoDetector {
    /// Creates a detector with this build's catalogue.
    pub fn new() -> Self {
        Self::with_catalogue(Arc::new(Catalogue::go()))
    }

    /// Creates a detector that snapshots the given catalogue into records.
    pub fn with_catalogue(catalogue: Arc<Catalogue>) -> Self {
        let patterns = DetectionPatterns::new(vec![GO_MANIFEST.to_string()])
            .with_optional_files(vec!["go.sum".to_string(), WORKSPACE_MARKER.to_string()])
            .with_directories(vec!["vendor".to_string()])
            .with_extensions(vec![".go".to_string()]);

        let defaults = Config::default();

        Self {
            framework: FrameworkInfo::new("go", "language"),
            patterns,
            catalogue,
            enable_workspace: AtomicBool::new(defaults.enable_workspace),
            enable_tools: AtomicBool::new(defaults.enable_tools),
        }
    }

    /// Returns the unique identifier for this detector.
    pub fn name(&self) -> &str {
        &self.framework.name
    }

    pub fn patterns(&self) -> &DetectionPatterns {
        &self.patterns
    }

    /// Sets whether `go.work` workspaces are reported.
    pub fn set_enable_workspace(&self, enabled: bool) {
        self.enable_workspace.store(enabled, Ordering::Relaxed);
    }

    /// Sets whether development tooling is reported.
    pub fn set_enable_tools(&self, enabled: bool) {
        self.enable_tools.store(enabled, Ordering::Relaxed);
    }

    /// Applies both feature gates.
    pub fn apply(&self, config: &Config) {
        self.set_enable_workspace(config.enable_workspace);
        self.set_enable_tools(config.enable_tools);
    }

    /// Returns the feature gates currently in effect.
    pub fn config(&self) -> Config {
        Config {
            enable_workspace: self.enable_workspace.load(Ordering::Relaxed),
            enable_tools: self.enable_tools.load(Ordering::Relaxed),
        }
    }

    /// Detects a Go project at `root`.
    ///
    /// Returns `Ok(None)` when `go.mod` is missing. Manifest problems never
    /// turn a detection negative; they only leave version and module unset.
    pub async fn detect(&self, root: &Path) -> Result<Option<DetectionRecord>> {
        let root = project_root(root);
        let evidence = match_patterns(root, &self.patterns).await?;
        if !evidence.detected {
            return Ok(None);
        }

        debug!(
            "Go signals in {}: {:?} (confidence {})",
            root.display(),
            evidence.signals,
            evidence.confidence
        );

        let mut record = DetectionRecord::new(
            self.framework.clone(),
            evidence.confidence,
            self.catalogue.snapshot(),
        );

        match glide_go_parser::read_manifest(&root.join(GO_MANIFEST)).await {
            Ok(manifest) => {
                record.version = manifest.version;
                record.module = manifest.module;
            }
            Err(e) => debug!("{} ({})", e, e.kind()),
        }

        let config = self.config();

        if config.enable_workspace && exists(&root.join(WORKSPACE_MARKER)).await {
            record.workspace = true;
        }

        if config.enable_tools && self.has_go_tools(root).await {
            record.has_dev_tools = true;
            record.boost(SIGNAL_BOOST);
        }

        Ok(Some(record))
    }

    /// Combines detector outputs; the newer one wins.
    pub fn merge(
        &self,
        existing: Option<DetectionRecord>,
        new: Option<DetectionRecord>,
    ) -> Option<DetectionRecord> {
        merge(existing, new)
    }

    /// Checks for common Go development tool configuration.
    async fn has_go_tools(&self, root: &Path) -> bool {
        for marker in TOOL_MARKERS {
            if exists(&root.join(marker)).await {
                return true;
            }
        }
        false
    }
}

impl Default for GoDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// An empty root means the current directory.
fn project_root(root: &Path) -> &Path {
    if root.as_os_str().is_empty() {
        Path::new(".")
    } else {
        root
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}
