//! Framework identity and detection patterns.

use serde::{Deserialize, Serialize};

/// Identity of a detected framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkInfo {
    /// Stable lowercase token (e.g. `go`).
    pub name: String,

    /// Category tag (e.g. `language`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// Filesystem signals scored by the pattern matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionPatterns {
    /// Basenames that must all exist at the project root.
    pub required_files: Vec<String>,

    /// Basenames whose presence raises confidence.
    pub optional_files: Vec<String>,

    /// Directory basenames whose presence raises confidence.
    pub directories: Vec<String>,

    /// File extensions (with leading dot) counted in a shallow walk.
    pub extensions: Vec<String>,
}

impl FrameworkInfo {
    /// Creates a new framework descriptor.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

impl DetectionPatterns {
    /// Creates patterns with the given required files.
    pub fn new(required_files: Vec<String>) -> Self {
        Self {
            required_files,
            ..Self::default()
        }
    }

    /// Sets the optional files.
    pub fn with_optional_files(mut self, files: Vec<String>) -> Self {
        self.optional_files = files;
        self
    }

    /// Sets the directories.
    pub fn with_directories(mut self, dirs: Vec<String>) -> Self {
        self.directories = dirs;
        self
    }

    /// Sets the extensions.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}
