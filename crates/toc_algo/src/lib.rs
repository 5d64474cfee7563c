// crates/toc_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Build-phase algorithms. Everything here runs once per TOC over the full
//! proposal set: no viewer, no permission data, no I/O.

use thiserror::Error;

pub use toc_core::{GroupingTable, Level, ProposalKey, RegionTable};

// ----------------------------- Errors -----------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlgoError {
    /// Invalid engine configuration (column sets, declared groups).
    #[error("grouping configuration: {0}")]
    Config(#[from] toc_core::CoreError),
}

// ----------------------------- Grouping -----------------------------

pub mod grouping {
    // File modules
    pub mod flat;
    pub mod hierarchical;

    pub use flat::{CellMode, FlatGroupingEngine};
    pub use hierarchical::HierarchicalGroupingEngine;
}

// ----------------------------- Enrichment -----------------------------

pub mod enrichment {
    pub mod region;

    pub use region::{enrich_with_regions, RegionEnrichment, ENRICHMENT_LEVELS};
}

pub use enrichment::{enrich_with_regions, RegionEnrichment, ENRICHMENT_LEVELS};
pub use grouping::{CellMode, FlatGroupingEngine, HierarchicalGroupingEngine};
