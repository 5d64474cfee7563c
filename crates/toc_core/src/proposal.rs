//! crates/toc_core/src/proposal.rs
//! Proposal source seams. The grouping engines only ever see these traits;
//! `toc_io` provides the file-backed data and tests build it in memory.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::ProposalKey;

/// Read-only view of one competition entry.
pub trait Proposal {
    fn key(&self) -> &ProposalKey;

    /// Cell value for `column`; an absent column reads as the empty string.
    fn cell(&self, column: &str) -> &str;
}

/// A competition: a name (which is also the name of the viewer-accessible
/// proposal set at render time) and its proposals in canonical order.
pub trait Competition {
    type Entry: Proposal;

    fn name(&self) -> &str;
    fn ordered_proposals(&self) -> Vec<&Self::Entry>;
}

/// In-memory proposal: key + column cells.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProposalRecord {
    pub key: ProposalKey,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cells: BTreeMap<String, String>,
}

impl ProposalRecord {
    pub fn new(key: ProposalKey) -> Self {
        Self { key, cells: BTreeMap::new() }
    }

    /// Builder-style cell setter.
    pub fn with_cell(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }
}

impl Proposal for ProposalRecord {
    fn key(&self) -> &ProposalKey {
        &self.key
    }

    fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// In-memory competition. `proposals` is kept in source order.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompetitionData {
    pub name: String,
    pub proposals: Vec<ProposalRecord>,
}

impl Competition for CompetitionData {
    type Entry = ProposalRecord;

    fn name(&self) -> &str {
        &self.name
    }

    fn ordered_proposals(&self) -> Vec<&ProposalRecord> {
        self.proposals.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_read_empty() {
        let p = ProposalRecord::new("P1".parse().unwrap()).with_cell("Country", "Wakanda");
        assert_eq!(p.cell("Country"), "Wakanda");
        assert_eq!(p.cell("State"), "");
    }

    #[test]
    fn competition_keeps_source_order() {
        let c = CompetitionData {
            name: "LFC".into(),
            proposals: vec![
                ProposalRecord::new("B".parse().unwrap()),
                ProposalRecord::new("A".parse().unwrap()),
            ],
        };
        let keys: Vec<&str> = c.ordered_proposals().iter().map(|p| p.key().as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }
}
