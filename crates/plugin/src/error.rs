//! Plugin error types.

use thiserror::Error;

/// Error type for plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The host supplied a configuration that does not bind to `Config`.
    #[error("Invalid plugin configuration: {0}")]
    ConfigInvalid(String),

    /// The plugin has begun shutting down.
    #[error("Plugin is not serving")]
    NotServing,

    /// A request line could not be understood.
    #[error("Malformed request: {0}")]
    Protocol(String),

    /// The method is not part of the RPC surface.
    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    /// The method exists but this build does not advertise it.
    #[error("Capability '{0}' is not supported by this build")]
    Unsupported(String),

    /// Serialization error.
    #[error("Failed to serialize response: {0}")]
    Serialize(String),

    /// Failed to bind the RPC listener.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::Serialize(err.to_string())
    }
}

impl PluginError {
    /// Stable token sent as the RPC error code.
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::ConfigInvalid(_) => "config-invalid",
            PluginError::NotServing => "not-serving",
            PluginError::Protocol(_) => "protocol-error",
            PluginError::UnknownMethod(_) => "unknown-method",
            PluginError::Unsupported(_) => "unsupported",
            PluginError::Serialize(_) => "serialize-error",
            PluginError::Bind { .. } => "bind-failed",
            PluginError::Io(_) => "io-error",
        }
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
