//! toc_pipeline: TOC facade and orchestration.
//!
//! - `Toc`: one configured TOC. Constructed once (static configuration), built
//!   exactly once from a competition, then read any number of times through
//!   `grouped_data()` and `render_spec()`.
//! - `definition`: manifest `TocDefinition` → `Toc`.
//! - `run`: whole-manifest flow (load → build → artifacts → optional render pass).
//!
//! File access goes through `toc_io`; grouping through `toc_algo`; plans through `toc_report`.

#![forbid(unsafe_code)]

use thiserror::Error;
use toc_algo::AlgoError;
use toc_io::IoError;
use toc_report::ReportError;

pub mod budget;
pub mod definition;
pub mod run;
pub mod toc;

pub use budget::{ANNUAL_BUDGET_BRACKETS, ANNUAL_BUDGET_TOC_NAME};
pub use definition::toc_from_definition;
pub use run::{run_from_manifest_path, RunOptions, RunSummary, TocSummary};
pub use toc::{Toc, TocKind};

/// Single error surface for TOC construction, build and orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid toc name: {0:?}")]
    InvalidName(String),

    /// A manifest definition that does not fit its kind.
    #[error("toc {toc}: {problem}")]
    Definition { toc: String, problem: String },

    #[error("toc {0}: build may only run once")]
    AlreadyBuilt(String),

    #[error("toc {0}: not built yet")]
    NotBuilt(String),

    #[error("grouping: {0}")]
    Algo(#[from] AlgoError),

    /// Plan synthesis failure (bad column definition, bad plan parameters).
    #[error("render plan: {0}")]
    Report(#[from] ReportError),

    /// Plan interpretation failure for a viewer.
    #[error("toc {toc}: render failed: {source}")]
    Render { toc: String, source: ReportError },

    #[error(transparent)]
    Io(#[from] IoError),
}
