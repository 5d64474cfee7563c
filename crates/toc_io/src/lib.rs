//! crates/toc_io/src/lib.rs
//! Local file I/O for TOC building. Nothing here groups or renders.
//!
//! - `manifest`: the TOC manifest (JSON) and path resolution against its directory.
//! - `loader`: competition proposals (JSON), country region table (CSV), viewer context (JSON).
//! - `artifacts`: atomic writes of grouped data, render plans and rendered text.
//!
//! All paths are local; anything that looks like a URL is rejected.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod artifacts;
pub mod loader;
pub mod manifest;

/// Unified error for toc_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON parse or write errors, with the line/column serde_json reports.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Region table parse errors.
    #[error("csv error: {0}")]
    Csv(String),

    /// Manifest shape / path policy violations.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Well-formed input that breaks a data invariant.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; line/column is the best locator it gives.
        let pointer = if e.line() == 0 { "/".to_string() } else { format!("line {} column {}", e.line(), e.column()) };
        IoError::Json { pointer, msg: e.to_string() }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url(s: &str) -> bool {
    let s = s.trim();
    s.contains("://") || s.starts_with("http:") || s.starts_with("https:")
}

pub mod prelude {
    pub use crate::artifacts::{write_json_atomic, write_text_atomic, ArtifactPaths};
    pub use crate::loader::{load_competition, load_region_table, load_viewer};
    pub use crate::manifest::{load_manifest, ResolvedManifest, TocDefinition, TocKind, TocManifest};
    pub use crate::{looks_like_url, IoError, IoResult};
}
