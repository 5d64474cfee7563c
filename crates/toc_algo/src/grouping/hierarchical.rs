// crates/toc_algo/src/grouping/hierarchical.rs
//
// N-level grouping. Each column set is an ordered tuple of N columns
// (e.g. Country, State, County). Every proposal is walked down every column set:
// a blank value abandons that column set for that proposal, so no partial
// paths are created. Leaves hold deduplicated proposal keys. When all
// proposals are placed, every level is sorted by key.
//
// Several column sets fold into one shared tree: a proposal reachable through
// two sets that resolve to the same leaf appears there once.

use toc_core::{CoreError, HierarchicalNode, Level, Proposal};
use tracing::debug;

use crate::AlgoError;

#[derive(Clone, Debug)]
pub struct HierarchicalGroupingEngine {
    column_sets: Vec<Vec<String>>,
    depth: usize,
}

impl HierarchicalGroupingEngine {
    /// Column sets must be non-empty and share one non-zero length.
    pub fn new(column_sets: Vec<Vec<String>>) -> Result<Self, AlgoError> {
        let depth = column_sets.first().map(Vec::len).unwrap_or(0);
        if depth == 0 {
            return Err(CoreError::EmptyColumnSets.into());
        }
        if let Some(bad) = column_sets.iter().find(|s| s.len() != depth) {
            return Err(CoreError::UnevenColumnSets { expected: depth, found: bad.len() }.into());
        }
        Ok(Self { column_sets, depth })
    }

    /// Number of levels of every tree this engine builds.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn column_sets(&self) -> &[Vec<String>] {
        &self.column_sets
    }

    pub fn build<'a, P, I>(&self, proposals: I) -> Level
    where
        P: Proposal + ?Sized + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let mut root = Level::new();
        let mut visited = 0usize;
        for proposal in proposals {
            visited += 1;
            for set in &self.column_sets {
                place(proposal, &mut root, set);
            }
        }
        root.sort_recursive();

        debug!(depth = self.depth, proposals = visited, top_level = root.len(), "hierarchical grouping built");
        root
    }
}

/// Walk `columns` left to right below `level`. Values are read and checked
/// before any node is created, so an abandoned walk leaves no trace.
fn place<P: Proposal + ?Sized>(proposal: &P, level: &mut Level, columns: &[String]) {
    let mut path: Vec<&str> = Vec::with_capacity(columns.len());
    for column in columns {
        let val = proposal.cell(column).trim();
        if val.is_empty() {
            return;
        }
        path.push(val);
    }
    insert_path(level, &path, proposal);
}

fn insert_path<P: Proposal + ?Sized>(level: &mut Level, path: &[&str], proposal: &P) {
    match path {
        [] => {}
        [last] => level.get_or_insert_with(last, HierarchicalNode::leaf).push_proposal(proposal.key()),
        [head, rest @ ..] => {
            let node = level.get_or_insert_with(head, HierarchicalNode::branch);
            if let Some(sub) = node.subcolumn_mut() {
                insert_path(sub, rest, proposal);
            }
        }
    }
}
