//! Go module root discovery.

use std::path::{Path, PathBuf};

use glide_go_engine::GO_MANIFEST;
use miette::{Result, miette};

/// Returns the current directory.
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| miette!("Cannot get current directory: {}", e))
}

/// Finds the nearest directory at or above `start` that contains `go.mod`.
pub fn find_module_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GO_MANIFEST).is_file())
        .map(Path::to_path_buf)
}

/// Resolves the directory a local command should act on: the explicit
/// path if given, otherwise the enclosing module root, otherwise the
/// current directory.
pub fn resolve_project_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let cwd = current_dir()?;
    Ok(find_module_root(&cwd).unwrap_or(cwd))
}
