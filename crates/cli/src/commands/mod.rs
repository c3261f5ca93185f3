//! CLI command implementations.

pub mod detect;
pub mod exec;
pub mod list;
pub mod serve;
