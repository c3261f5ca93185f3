//! Glide Go Engine - Detection pipeline and command execution for Go projects.

mod cancel;
mod catalogue;
mod detector;
mod matcher;
mod runner;

pub use cancel::CancelToken;
pub use catalogue::Catalogue;
pub use detector::{GO_MANIFEST, GoDetector, TOOL_MARKERS, WORKSPACE_MARKER};
pub use matcher::{
    BASE_CONFIDENCE, Evidence, SCAN_DEPTH, SIGNAL_BOOST, count_matching_files, match_patterns,
};
pub use runner::{CommandResult, CommandRunner, Invocation};
