//! Manifest reader error types.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for reading a `go.mod` manifest.
///
/// None of these abort a detection: the detector treats them as
/// "version and module unknown".
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The manifest could not be opened.
    #[error("Failed to open manifest {}", path.display())]
    #[diagnostic(code(glide_go::manifest::not_found))]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest was opened but reading it failed part way.
    #[error("Failed to read manifest {}", path.display())]
    #[diagnostic(code(glide_go::manifest::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither a `module` nor a `go` directive was found.
    #[error("No module or go directive in {}", path.display())]
    #[diagnostic(
        code(glide_go::manifest::empty),
        help("go.mod normally starts with `module <path>` followed by `go <version>`")
    )]
    Empty { path: PathBuf },
}

impl ManifestError {
    /// Stable token identifying the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ManifestError::NotFound { .. } => "not-found",
            ManifestError::Read { .. } => "read-error",
            ManifestError::Empty { .. } => "parse-empty",
        }
    }
}
