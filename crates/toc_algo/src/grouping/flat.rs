// crates/toc_algo/src/grouping/flat.rs
//
// One-level grouping of proposals by column value.
//
// Contract:
// - Proposals are visited in source order; within a group, keys are appended
//   in that order.
// - Declared groups come first, in declared order, even if they stay empty.
//   Undeclared values are appended in first-seen order.
// - Blank keys (empty or whitespace-only) are skipped; there is no
//   "ungrouped" bucket.
// - Multi-line mode splits each cell on '\n' and files the proposal under every
//   non-blank line. Every hit appends, so a proposal whose columns (or lines)
//   repeat a value appears that many times in the group.

use toc_core::{GroupingTable, Proposal};
use tracing::debug;

use crate::AlgoError;

/// How a cell value becomes grouping keys.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CellMode {
    /// The whole cell is one key.
    #[default]
    Single,
    /// Each line of the cell is a key.
    MultiLine,
}

impl CellMode {
    fn keys<'c>(self, cell: &'c str) -> Vec<&'c str> {
        let raw: Vec<&str> = match self {
            CellMode::Single => vec![cell],
            CellMode::MultiLine => cell.split('\n').collect(),
        };
        raw.into_iter().filter(|k| !k.trim().is_empty()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct FlatGroupingEngine {
    columns: Vec<String>,
    mode: CellMode,
}

impl FlatGroupingEngine {
    pub fn new<I, S>(columns: I, mode: CellMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect(), mode }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn mode(&self) -> CellMode {
        self.mode
    }

    /// Partition `proposals` into a `GroupingTable` seeded with `declared`.
    pub fn build<'a, P, I>(&self, proposals: I, declared: &[String]) -> Result<GroupingTable, AlgoError>
    where
        P: Proposal + ?Sized + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let mut table = GroupingTable::with_declared(declared.iter().cloned())?;
        let mut visited = 0usize;

        for proposal in proposals {
            visited += 1;
            for column in &self.columns {
                for key in self.mode.keys(proposal.cell(column)) {
                    table.entry(key).all_proposal_ids.push(proposal.key().clone());
                }
            }
        }

        debug!(
            columns = ?self.columns,
            mode = ?self.mode,
            proposals = visited,
            groups = table.len(),
            "flat grouping built"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use toc_core::ProposalRecord;

    fn p(key: &str, cells: &[(&str, &str)]) -> ProposalRecord {
        cells
            .iter()
            .fold(ProposalRecord::new(key.parse().unwrap()), |acc, (c, v)| acc.with_cell(*c, *v))
    }

    fn ids(table: &GroupingTable, name: &str) -> Vec<String> {
        table
            .get(name)
            .unwrap()
            .all_proposal_ids
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    #[test]
    fn groups_by_single_column_in_first_seen_order() {
        let ps = vec![
            p("P1", &[("Topic", "Water")]),
            p("P2", &[("Topic", "Health")]),
            p("P3", &[("Topic", "Water")]),
        ];
        let t = FlatGroupingEngine::new(["Topic"], CellMode::Single).build(&ps, &[]).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["Water", "Health"]);
        assert_eq!(ids(&t, "Water"), vec!["P1", "P3"]);
    }

    #[test]
    fn blank_cells_land_in_no_group() {
        let ps = vec![p("P1", &[("Topic", "")]), p("P2", &[("Topic", "  ")]), p("P3", &[])];
        let t = FlatGroupingEngine::new(["Topic"], CellMode::Single).build(&ps, &[]).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn union_of_members_is_proposals_with_any_value() {
        let ps = vec![
            p("P1", &[("A", "x")]),
            p("P2", &[("B", "y")]),
            p("P3", &[("A", ""), ("B", "")]),
            p("P4", &[("A", "x"), ("B", "x")]),
        ];
        let t = FlatGroupingEngine::new(["A", "B"], CellMode::Single).build(&ps, &[]).unwrap();
        let members: BTreeSet<String> = t
            .iter()
            .flat_map(|g| g.all_proposal_ids.iter().map(|k| k.to_string()))
            .collect();
        let expected: BTreeSet<String> = ["P1", "P2", "P4"].iter().map(|s| s.to_string()).collect();
        assert_eq!(members, expected);
        // same value in two columns files P4 twice
        assert_eq!(ids(&t, "x"), vec!["P1", "P4", "P4"]);
    }

    #[test]
    fn multi_line_fans_out_and_single_line_does_not() {
        let ps = vec![p("P1", &[("Keywords", "A\nB")])];
        let multi = FlatGroupingEngine::new(["Keywords"], CellMode::MultiLine).build(&ps, &[]).unwrap();
        assert_eq!(ids(&multi, "A"), vec!["P1"]);
        assert_eq!(ids(&multi, "B"), vec!["P1"]);

        let single = FlatGroupingEngine::new(["Keywords"], CellMode::Single).build(&ps, &[]).unwrap();
        assert_eq!(single.names().collect::<Vec<_>>(), vec!["A\nB"]);
    }

    #[test]
    fn repeated_line_files_the_proposal_per_line() {
        let ps = vec![p("P5", &[("Keywords", "A\nA")])];
        let t = FlatGroupingEngine::new(["Keywords"], CellMode::MultiLine).build(&ps, &[]).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(ids(&t, "A"), vec!["P5", "P5"]);
    }

    #[test]
    fn multi_line_skips_blank_lines() {
        let ps = vec![p("P1", &[("Keywords", "A\n\n \nB\n")])];
        let t = FlatGroupingEngine::new(["Keywords"], CellMode::MultiLine).build(&ps, &[]).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn declared_groups_come_first() {
        let ps = vec![p("P1", &[("Budget", "Mid")]), p("P2", &[("Budget", "New")])];
        let declared: Vec<String> = ["Low", "Mid", "High"].iter().map(|s| s.to_string()).collect();
        let t = FlatGroupingEngine::new(["Budget"], CellMode::Single).build(&ps, &declared).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["Low", "Mid", "High", "New"]);
        assert!(t.get("Low").unwrap().all_proposal_ids.is_empty());
    }

    #[test]
    fn build_time_counts_are_zero() {
        let ps = vec![p("P1", &[("Topic", "Water")])];
        let t = FlatGroupingEngine::new(["Topic"], CellMode::Single).build(&ps, &[]).unwrap();
        let g = t.get("Water").unwrap();
        assert_eq!(g.num_filtered_proposals, 0);
        assert!(g.filtered_proposal_ids.is_empty());
    }
}
