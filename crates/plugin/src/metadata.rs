//! Plugin identity and capabilities served to the host.

use serde::{Deserialize, Serialize};

/// Plugin metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Plugin name.
    pub name: String,

    /// Plugin version.
    pub version: String,

    /// Plugin author.
    #[serde(default)]
    pub author: String,

    /// Plugin description.
    #[serde(default)]
    pub description: String,

    /// Plugin homepage.
    #[serde(default)]
    pub homepage: String,

    /// Plugin license.
    #[serde(default)]
    pub license: String,

    /// Search tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Alternative names the host may use.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Whether command names are prefixed with the plugin name.
    #[serde(default)]
    pub namespaced: bool,
}

/// An RPC capability advertised at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Detect,
    Execute,
    Health,
}

impl Metadata {
    /// Creates metadata with just name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: String::new(),
            description: String::new(),
            homepage: String::new(),
            license: String::new(),
            tags: Vec::new(),
            aliases: Vec::new(),
            namespaced: false,
        }
    }

    /// Metadata of the Go plugin. Commands are not namespaced: the host
    /// exposes `build`, not `go:build`.
    pub fn go() -> Self {
        Self::new("go", env!("CARGO_PKG_VERSION"))
            .with_author("Glide Team")
            .with_description("Go framework detector and command provider for Glide")
            .with_homepage(env!("CARGO_PKG_HOMEPAGE"))
            .with_license(env!("CARGO_PKG_LICENSE"))
            .with_tags(["language", "go", "golang"])
            .with_aliases(["golang"])
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the homepage.
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    /// Sets the license.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    /// Sets the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}
