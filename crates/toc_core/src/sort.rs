//! crates/toc_core/src/sort.rs
//! Render-time ordering of flat groups.

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grouping::Group;

/// How groups are ordered when a plan iterates them.
///
/// `ByCount` sorts on `num_filtered_proposals`, which is only meaningful once a
/// render pass has filtered the groups for a viewer; built data always has 0.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SortPolicy {
    /// Keep the grouping table order.
    #[default]
    None,
    /// Ascending by group name.
    #[cfg_attr(feature = "serde", serde(alias = "name"))]
    ByName,
    /// Descending by filtered count; ties keep table order.
    #[cfg_attr(feature = "serde", serde(alias = "count"))]
    ByCount,
}

impl SortPolicy {
    /// Effective policy for a flat TOC: an explicit choice wins; otherwise
    /// declared groups keep their declared order and undeclared tables sort
    /// by name.
    pub fn resolve(explicit: Option<SortPolicy>, has_declared_groups: bool) -> SortPolicy {
        match explicit {
            Some(p) => p,
            None if has_declared_groups => SortPolicy::None,
            None => SortPolicy::ByName,
        }
    }

    fn compare(self, a: &Group, b: &Group) -> Ordering {
        match self {
            SortPolicy::None => Ordering::Equal,
            SortPolicy::ByName => a.name.cmp(&b.name),
            SortPolicy::ByCount => b.num_filtered_proposals.cmp(&a.num_filtered_proposals),
        }
    }

    /// Indices of `groups` in display order. Stable: equal keys keep table order.
    pub fn order(self, groups: &[Group]) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..groups.len()).collect();
        idx.sort_by(|&a, &b| self.compare(&groups[a], &groups[b]));
        idx
    }
}
