//! toc_core: Core types shared by every TOC crate.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! workspace (`toc_io`, `toc_algo`, `toc_report`, `toc_pipeline`, `toc_cli`).
//!
//! - Proposal identity: `ProposalKey`
//! - Proposal source seams: `Proposal`, `Competition` (+ in-memory impls)
//! - Grouped data: `Group`, `GroupingTable`, `HierarchicalNode`, `Level`, `GroupedData`
//! - Render-time ordering: `SortPolicy`
//! - External lookup: `RegionTable`
//! - Raw column descriptors: `ColumnSpec`, `FormatterSpec`
//! - Render-phase input: `ViewerContext`
//!
//! Serialization derives are gated behind the `serde` feature (on by default).

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidKey,
        EmptyColumnSets,
        UnevenColumnSets { expected: usize, found: usize },
        DuplicateGroup(String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidKey => write!(f, "invalid identifier"),
                CoreError::EmptyColumnSets => write!(f, "at least one non-empty column set is required"),
                CoreError::UnevenColumnSets { expected, found } => {
                    write!(f, "column sets must share one length: expected {expected}, found {found}")
                }
                CoreError::DuplicateGroup(name) => write!(f, "group declared twice: {name}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod columns;
pub mod grouping;
pub mod ids;
pub mod proposal;
pub mod region;
pub mod sort;
pub mod viewer;

pub use columns::{ColumnSpec, FormatterSpec};
pub use errors::CoreError;
pub use grouping::{Group, GroupedData, GroupingTable, HierarchicalNode, Level, NodeBody};
pub use ids::{ProposalKey, TocName};
pub use proposal::{Competition, CompetitionData, Proposal, ProposalRecord};
pub use region::{RegionEntry, RegionTable};
pub use sort::SortPolicy;
pub use viewer::{AccessSet, ProposalFields, ViewerContext};
