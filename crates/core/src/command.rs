//! Developer command definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named developer command exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Shell string, split on whitespace before spawning.
    pub cmd: String,

    /// Human-readable description.
    pub description: String,

    /// Category tag.
    pub category: CommandCategory,
}

/// The category a command is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    Build,
    Test,
    Run,
    Format,
    Lint,
    Dependencies,
}

impl CommandDefinition {
    /// Creates a new command definition.
    pub fn new(
        cmd: impl Into<String>,
        description: impl Into<String>,
        category: CommandCategory,
    ) -> Self {
        Self {
            cmd: cmd.into(),
            description: description.into(),
            category,
        }
    }

    /// Splits the shell string into program and arguments.
    ///
    /// No quoting is supported: catalogue entries never carry arguments
    /// containing whitespace.
    pub fn tokens(&self) -> Vec<&str> {
        self.cmd.split_whitespace().collect()
    }
}

impl CommandCategory {
    /// Every documented category.
    pub const ALL: [CommandCategory; 6] = [
        CommandCategory::Build,
        CommandCategory::Test,
        CommandCategory::Run,
        CommandCategory::Format,
        CommandCategory::Lint,
        CommandCategory::Dependencies,
    ];

    /// Returns the wire tag for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCategory::Build => "build",
            CommandCategory::Test => "test",
            CommandCategory::Run => "run",
            CommandCategory::Format => "format",
            CommandCategory::Lint => "lint",
            CommandCategory::Dependencies => "dependencies",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CommandCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown command category '{}'", s))
    }
}
