//! toc_report: render plans for TOCs.
//!
//! Two phases meet here:
//! - build time: `synthesize` turns a TOC shape + formatter + sort policy into a
//!   `RenderSpecification`, a small plan tree that references columns and the
//!   two injected names (grouped data, accessible proposal set) but no data.
//! - render time: `render` runs that plan for one viewer against the grouped
//!   data. Every run starts from a private, reset copy of the data, so one
//!   uploaded artifact can be rendered for any number of viewers.
//!
//! No I/O here. Callers supply the grouped data and viewer context in memory.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod formatter;
pub mod plan;
pub mod render;
pub mod synth;

pub use formatter::{CellFn, ColumnDef, ColumnSource, Computed, ProposalFormatter, RowView, TableFormatter};
pub use plan::{Node, RenderSpecification, TocShape};
pub use render::render;
pub use synth::{synthesize, TemplateSynthesizer};

// ===== Errors =====

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A column descriptor without exactly one of direct reference / computed value.
    #[error("column definition '{heading}': {problem}")]
    ColumnDefinition { heading: String, problem: &'static str },

    /// Plan and data (or plan parameters) do not fit together.
    #[error("plan shape: {0}")]
    Shape(String),

    /// The viewer context has no accessible set under the plan's access name.
    #[error("no accessible proposal set named '{0}'")]
    UnknownAccessSet(String),

    /// A computed-cell template failed to render.
    #[error("computed cell template: {0}")]
    Template(String),

    /// A plan node was evaluated outside the loop that binds it.
    #[error("plan node '{0}' evaluated outside its scope")]
    Scope(&'static str),
}
