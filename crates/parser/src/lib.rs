//! Glide Go Parser - `go.mod` directive reader using nom combinators.
//!
//! Only the `module` and `go` directives are read; everything else in the
//! manifest is ignored.

mod combinators;
mod error;
mod manifest;

pub use combinators::{Directive, directive};
pub use error::ManifestError;
pub use manifest::{Manifest, read_manifest};
