//! Glide Go Plugin - Host-facing shell of the Go detector.
//!
//! Wraps the detection engine and command runner behind the plugin RPC
//! surface: registration metadata, configuration, detection, execution and
//! health checks, served as JSON lines.

mod error;
mod metadata;
mod plugin;
mod protocol;
mod server;

pub use error::{PluginError, Result};
pub use metadata::{Capability, Metadata};
pub use plugin::GoPlugin;
pub use protocol::{
    CancelParams, ContextRequest, ContextResponse, DEV_TOOLS, EXTENSION_NAME, ExecuteRequest,
    ExecuteResponse, Registration, Request, Response, RpcError,
};
pub use server::{serve, serve_until};
