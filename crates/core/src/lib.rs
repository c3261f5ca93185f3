//! Glide Go Core - Core types and errors for the Go framework detector.

mod command;
mod config;
mod error;
mod framework;
mod record;

pub use command::{CommandCategory, CommandDefinition};
pub use config::Config;
pub use error::{GlideError, Result};
pub use framework::{DetectionPatterns, FrameworkInfo};
pub use record::{DetectionRecord, MAX_CONFIDENCE, merge};
