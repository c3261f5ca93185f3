//! The typed detection record and its wire coercion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::CommandDefinition;
use crate::framework::FrameworkInfo;

/// Upper bound of the confidence scale.
pub const MAX_CONFIDENCE: u8 = 100;

/// Metadata produced by a positive detection.
///
/// A record only exists for a detected project; "not detected" is `None`
/// at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// The detected framework.
    pub framework: FrameworkInfo,

    /// Confidence in `[0, 100]`.
    pub confidence: u8,

    /// Snapshot of the command catalogue.
    pub commands: BTreeMap<String, CommandDefinition>,

    /// Declared language version, when the manifest carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Module path, when the manifest carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// The root is part of a multi-module workspace.
    #[serde(default)]
    pub workspace: bool,

    /// Auxiliary tooling configuration was found.
    #[serde(default)]
    pub has_dev_tools: bool,
}

impl DetectionRecord {
    /// Creates a record for a detected framework.
    pub fn new(
        framework: FrameworkInfo,
        confidence: u8,
        commands: BTreeMap<String, CommandDefinition>,
    ) -> Self {
        Self {
            framework,
            confidence: confidence.min(MAX_CONFIDENCE),
            commands,
            version: None,
            module: None,
            workspace: false,
            has_dev_tools: false,
        }
    }

    /// Raises confidence, saturating at the top of the scale.
    pub fn boost(&mut self, amount: u8) {
        self.confidence = self.confidence.saturating_add(amount).min(MAX_CONFIDENCE);
    }

    /// Flattens the record into the host's string map.
    ///
    /// `commands` is never included, and the boolean discoveries appear only
    /// when they were found.
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert("framework".to_string(), self.framework.name.clone());
        metadata.insert("type".to_string(), self.framework.kind.clone());
        metadata.insert("confidence".to_string(), self.confidence.to_string());

        if let Some(version) = &self.version {
            metadata.insert("version".to_string(), version.clone());
            metadata.insert("go_version".to_string(), version.clone());
        }

        if let Some(module) = &self.module {
            metadata.insert("module".to_string(), module.clone());
        }

        if self.workspace {
            metadata.insert("workspace".to_string(), "true".to_string());
        }

        if self.has_dev_tools {
            metadata.insert("has_dev_tools".to_string(), "true".to_string());
        }

        metadata
    }
}

/// Combines a previous detector output with a fresh one.
///
/// The newest output wins whenever there is one: a detector that just
/// examined the project is authoritative for its own fields. Not
/// commutative.
pub fn merge(
    existing: Option<DetectionRecord>,
    new: Option<DetectionRecord>,
) -> Option<DetectionRecord> {
    new.or(existing)
}
