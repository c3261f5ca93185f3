//! The Go developer command catalogue.

use std::collections::BTreeMap;

use glide_go_core::{CommandCategory, CommandDefinition};

/// `(name, cmd, description, category)` for every Go command.
#[cfg(feature = "commands")]
const GO_COMMANDS: &[(&str, &str, &str, CommandCategory)] = &[
    ("build", "go build ./...", "Build Go project", CommandCategory::Build),
    ("test", "go test ./...", "Run Go tests", CommandCategory::Test),
    (
        "test:v",
        "go test -v ./...",
        "Run Go tests with verbose output",
        CommandCategory::Test,
    ),
    (
        "test:race",
        "go test -race ./...",
        "Run Go tests with race detector",
        CommandCategory::Test,
    ),
    (
        "test:cover",
        "go test -cover ./...",
        "Run Go tests with coverage",
        CommandCategory::Test,
    ),
    ("run", "go run .", "Run Go application", CommandCategory::Run),
    ("fmt", "go fmt ./...", "Format Go code", CommandCategory::Format),
    ("vet", "go vet ./...", "Examine Go source code", CommandCategory::Lint),
    (
        "mod:tidy",
        "go mod tidy",
        "Add missing and remove unused modules",
        CommandCategory::Dependencies,
    ),
    (
        "mod:download",
        "go mod download",
        "Download modules to local cache",
        CommandCategory::Dependencies,
    ),
    (
        "mod:vendor",
        "go mod vendor",
        "Make vendored copy of dependencies",
        CommandCategory::Dependencies,
    ),
    ("generate", "go generate ./...", "Generate Go files", CommandCategory::Build),
];

/// Static mapping from user-facing command names to definitions.
///
/// Names may contain `:` (e.g. `test:race`); the separator carries no
/// meaning here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    commands: BTreeMap<String, CommandDefinition>,
}

impl Catalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue shipped with this build. Empty when the `commands`
    /// feature is disabled.
    pub fn go() -> Self {
        #[cfg(feature = "commands")]
        {
            GO_COMMANDS
                .iter()
                .fold(Self::new(), |catalogue, (name, cmd, description, category)| {
                    catalogue.with_command(
                        *name,
                        CommandDefinition::new(*cmd, *description, *category),
                    )
                })
        }

        #[cfg(not(feature = "commands"))]
        {
            Self::new()
        }
    }

    /// Adds a command.
    pub fn with_command(mut self, name: impl Into<String>, definition: CommandDefinition) -> Self {
        self.commands.insert(name.into(), definition);
        self
    }

    /// Looks up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    /// Iterates commands sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandDefinition)> {
        self.commands.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Returns all command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }

    /// Returns the commands in a category, sorted by name.
    pub fn by_category(&self, category: CommandCategory) -> Vec<(&str, &CommandDefinition)> {
        self.iter().filter(|(_, def)| def.category == category).collect()
    }

    /// Returns a copy of the table for inclusion in a detection record.
    pub fn snapshot(&self) -> BTreeMap<String, CommandDefinition> {
        self.commands.clone()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
