//! Feature gates supplied by the host.

use serde::{Deserialize, Serialize};

/// Plugin configuration.
///
/// Missing keys take their defaults and unknown keys are ignored. The
/// host's camelCase spelling is accepted alongside snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detect `go.work` workspaces.
    #[serde(alias = "enableWorkspace")]
    pub enable_workspace: bool,

    /// Detect auxiliary tooling and boost confidence when present.
    #[serde(alias = "enableTools")]
    pub enable_tools: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_workspace: true,
            enable_tools: true,
        }
    }
}

impl Config {
    /// Sets the workspace gate.
    pub fn with_workspace(mut self, enabled: bool) -> Self {
        self.enable_workspace = enabled;
        self
    }

    /// Sets the tooling gate.
    pub fn with_tools(mut self, enabled: bool) -> Self {
        self.enable_tools = enabled;
        self
    }
}
