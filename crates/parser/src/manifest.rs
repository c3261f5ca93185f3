//! Line-oriented extraction of identity and version from `go.mod`.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::combinators::{Directive, directive};
use crate::error::ManifestError;

/// The two facts the detector needs from `go.mod`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Module path from the `module` directive.
    pub module: Option<String>,

    /// Language version from the `go` directive.
    pub version: Option<String>,
}

impl Manifest {
    /// Folds one line into the manifest. The first occurrence of each
    /// directive wins.
    fn scan_line(&mut self, line: &str) {
        match directive(line.trim()) {
            Some(Directive::Module(module)) if self.module.is_none() => {
                self.module = Some(module.to_string());
            }
            Some(Directive::Go(version)) if self.version.is_none() => {
                self.version = Some(version.to_string());
            }
            _ => {}
        }
    }

    /// Returns true once both directives have been seen.
    fn is_complete(&self) -> bool {
        self.module.is_some() && self.version.is_some()
    }

    fn is_empty(&self) -> bool {
        self.module.is_none() && self.version.is_none()
    }
}

/// Streams a manifest file line by line, stopping once both directives are
/// known.
///
/// Lines are read as bytes and decoded lossily, so stray non-UTF-8 bytes in
/// comments do not hide the directives. A read failure after a directive was
/// found keeps what was found.
pub async fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let file = File::open(path)
        .await
        .map_err(|source| ManifestError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

    let mut reader = BufReader::new(file);
    let mut manifest = Manifest::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                manifest.scan_line(&String::from_utf8_lossy(&line));
                if manifest.is_complete() {
                    break;
                }
            }
            Err(source) if manifest.is_empty() => {
                return Err(ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(_) => break,
        }
    }

    if manifest.is_empty() {
        return Err(ManifestError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(manifest)
}
