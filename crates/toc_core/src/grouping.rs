//! crates/toc_core/src/grouping.rs
//! Grouped-data model handed from the build phase to the render phase.
//!
//! Build-time fields (`all_proposal_ids`, the node tree, leaf `proposals`) are
//! fixed once built. Render-time fields (`filtered_proposal_ids`,
//! `num_filtered_proposals`, `shown`) are placeholders: they are always empty /
//! zero / false in built data and are re-derived by every render pass.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::ProposalKey;

// ------------------------------- Flat groups -------------------------------

/// One named bucket of a flat grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    pub all_proposal_ids: Vec<ProposalKey>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub filtered_proposal_ids: Vec<ProposalKey>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub num_filtered_proposals: u64,
    pub name: String,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            all_proposal_ids: Vec::new(),
            filtered_proposal_ids: Vec::new(),
            num_filtered_proposals: 0,
            name: name.into(),
        }
    }

    /// Clear the render-time placeholders.
    pub fn reset_render_state(&mut self) {
        self.filtered_proposal_ids.clear();
        self.num_filtered_proposals = 0;
    }
}

/// Name → `Group`, remembering insertion order (declared groups first, then
/// first-seen order).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupingTable {
    groups: Vec<Group>,
    index: BTreeMap<String, usize>,
}

impl GroupingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with caller-declared groups, kept in declared order even
    /// when they end up empty.
    pub fn with_declared<I, S>(names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for name in names {
            let name = name.into();
            if table.index.contains_key(&name) {
                return Err(CoreError::DuplicateGroup(name));
            }
            table.entry(&name);
        }
        Ok(table)
    }

    /// Group named `name`, appended at the end if it does not exist yet.
    pub fn entry(&mut self, name: &str) -> &mut Group {
        let idx = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.groups.push(Group::new(name));
                let i = self.groups.len() - 1;
                self.index.insert(name.to_owned(), i);
                i
            }
        };
        &mut self.groups[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}

// ---------------------------- Hierarchical nodes ----------------------------

/// What hangs below a node: another level, or (at the deepest level) the
/// deduplicated proposal keys.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeBody {
    #[cfg_attr(feature = "serde", serde(rename = "subcolumn"))]
    Subcolumn(Level),
    #[cfg_attr(feature = "serde", serde(rename = "proposals"))]
    Proposals(Vec<ProposalKey>),
}

/// One named node of a hierarchical grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HierarchicalNode {
    #[cfg_attr(feature = "serde", serde(default))]
    pub shown: bool,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub body: NodeBody,
}

impl HierarchicalNode {
    pub fn branch() -> Self {
        Self { shown: false, body: NodeBody::Subcolumn(Level::new()) }
    }

    pub fn leaf() -> Self {
        Self { shown: false, body: NodeBody::Proposals(Vec::new()) }
    }

    pub fn subcolumn(&self) -> Option<&Level> {
        match &self.body {
            NodeBody::Subcolumn(l) => Some(l),
            NodeBody::Proposals(_) => None,
        }
    }

    pub fn subcolumn_mut(&mut self) -> Option<&mut Level> {
        match &mut self.body {
            NodeBody::Subcolumn(l) => Some(l),
            NodeBody::Proposals(_) => None,
        }
    }

    pub fn proposals(&self) -> Option<&[ProposalKey]> {
        match &self.body {
            NodeBody::Proposals(p) => Some(p),
            NodeBody::Subcolumn(_) => None,
        }
    }

    /// Append `key` to a leaf unless it is already present. No-op on branches.
    pub fn push_proposal(&mut self, key: &ProposalKey) {
        if let NodeBody::Proposals(keys) = &mut self.body {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
}

/// Ordered mapping of child key → node. Iteration order is insertion order
/// until `sort_recursive` is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    entries: Vec<(String, HierarchicalNode)>,
    index: BTreeMap<String, usize>,
}

impl Level {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn push(&mut self, key: String, node: HierarchicalNode) -> usize {
        let idx = self.entries.len();
        self.index.insert(key.clone(), idx);
        self.entries.push((key, node));
        idx
    }

    fn reindex(&mut self) {
        self.index = self.entries.iter().enumerate().map(|(i, (k, _))| (k.clone(), i)).collect();
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&HierarchicalNode> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut HierarchicalNode> {
        self.position(key).map(move |i| &mut self.entries[i].1)
    }

    /// Node at `key`, created with `make` and appended if absent.
    pub fn get_or_insert_with<F>(&mut self, key: &str, make: F) -> &mut HierarchicalNode
    where
        F: FnOnce() -> HierarchicalNode,
    {
        let idx = match self.position(key) {
            Some(i) => i,
            None => self.push(key.to_owned(), make()),
        };
        &mut self.entries[idx].1
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, node: HierarchicalNode) -> Option<HierarchicalNode> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, node)),
            None => {
                self.push(key, node);
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HierarchicalNode)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut HierarchicalNode)> {
        self.entries.iter_mut().map(|(k, n)| (k.as_str(), n))
    }

    pub fn into_entries(self) -> Vec<(String, HierarchicalNode)> {
        self.entries
    }

    /// Sort keys lexicographically at this level and every level below.
    pub fn sort_recursive(&mut self) {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.reindex();
        for (_, node) in &mut self.entries {
            if let Some(sub) = node.subcolumn_mut() {
                sub.sort_recursive();
            }
        }
    }

    /// Clear every `shown` flag below this level.
    pub fn reset_shown(&mut self) {
        for (_, node) in &mut self.entries {
            node.shown = false;
            if let Some(sub) = node.subcolumn_mut() {
                sub.reset_shown();
            }
        }
    }

    /// Depth of the tree if every path ends in a leaf at the same depth
    /// (a level holding only leaves has depth 1). `Some(0)` for an empty level.
    pub fn uniform_depth(&self) -> Option<usize> {
        let mut depth: Option<usize> = None;
        for (_, node) in &self.entries {
            let d = match &node.body {
                NodeBody::Proposals(_) => 1,
                NodeBody::Subcolumn(sub) if sub.is_empty() => return None,
                NodeBody::Subcolumn(sub) => 1 + sub.uniform_depth()?,
            };
            match depth {
                None => depth = Some(d),
                Some(prev) if prev != d => return None,
                Some(_) => {}
            }
        }
        Some(depth.unwrap_or(0))
    }
}

#[cfg(feature = "serde")]
impl Serialize for Level {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl<'de> serde::de::Visitor<'de> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of group name to node")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut access: A) -> Result<Level, A::Error> {
                let mut level = Level::new();
                while let Some((k, v)) = access.next_entry::<String, HierarchicalNode>()? {
                    level.insert(k, v);
                }
                Ok(level)
            }
        }

        deserializer.deserialize_map(LevelVisitor)
    }
}

// ------------------------------ Boundary artifact ------------------------------

/// The grouped-data document uploaded next to a render plan.
/// `Flat` and `Tree` both expose their data as `groups`; `List` as `proposal_ids`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum GroupedData {
    Flat { groups: Vec<Group> },
    Tree { groups: Level },
    List { proposal_ids: Vec<ProposalKey> },
}

impl GroupedData {
    /// Name under which the data is exposed to the renderer.
    pub fn data_var(&self) -> &'static str {
        match self {
            GroupedData::Flat { .. } | GroupedData::Tree { .. } => "groups",
            GroupedData::List { .. } => "proposal_ids",
        }
    }

    /// Clear all render-time placeholders (filtered ids, counts, shown flags).
    pub fn reset_render_state(&mut self) {
        match self {
            GroupedData::Flat { groups } => groups.iter_mut().for_each(Group::reset_render_state),
            GroupedData::Tree { groups } => groups.reset_shown(),
            GroupedData::List { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ProposalKey {
        s.parse().unwrap()
    }

    #[test]
    fn declared_groups_keep_order_and_new_ones_append() {
        let mut t = GroupingTable::with_declared(["Low", "Mid", "High"]).unwrap();
        t.entry("Mid").all_proposal_ids.push(key("P1"));
        t.entry("New").all_proposal_ids.push(key("P2"));
        let names: Vec<&str> = t.names().collect();
        assert_eq!(names, vec!["Low", "Mid", "High", "New"]);
        assert!(t.get("Low").unwrap().all_proposal_ids.is_empty());
    }

    #[test]
    fn duplicate_declared_group_is_rejected() {
        let err = GroupingTable::with_declared(["A", "A"]).unwrap_err();
        assert_eq!(err, CoreError::DuplicateGroup("A".into()));
    }

    #[test]
    fn leaf_push_is_idempotent() {
        let mut n = HierarchicalNode::leaf();
        n.push_proposal(&key("P1"));
        n.push_proposal(&key("P1"));
        n.push_proposal(&key("P2"));
        assert_eq!(n.proposals().unwrap(), &[key("P1"), key("P2")]);
    }

    #[test]
    fn sort_is_recursive() {
        let mut root = Level::new();
        let b = root.get_or_insert_with("b", HierarchicalNode::branch);
        let sub = b.subcolumn_mut().unwrap();
        sub.get_or_insert_with("z", HierarchicalNode::leaf);
        sub.get_or_insert_with("y", HierarchicalNode::leaf);
        root.get_or_insert_with("a", HierarchicalNode::branch)
            .subcolumn_mut()
            .unwrap()
            .get_or_insert_with("x", HierarchicalNode::leaf);

        root.sort_recursive();
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        let inner: Vec<&str> = root.get("b").unwrap().subcolumn().unwrap().keys().collect();
        assert_eq!(inner, vec!["y", "z"]);
        assert_eq!(root.uniform_depth(), Some(2));
    }

    #[test]
    fn lookups_follow_keys_across_sort_and_replace() {
        let mut root = Level::new();
        for k in ["c", "a", "b"] {
            root.get_or_insert_with(k, HierarchicalNode::leaf).push_proposal(&key(&format!("P{k}")));
        }
        root.sort_recursive();
        assert_eq!(root.get("c").unwrap().proposals().unwrap(), &[key("Pc")]);
        assert_eq!(root.get("a").unwrap().proposals().unwrap(), &[key("Pa")]);

        assert!(root.insert("b", HierarchicalNode::leaf()).is_some());
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(root.get("b").unwrap().proposals().unwrap().is_empty());
        root.get_mut("c").unwrap().shown = true;
        assert!(root.get("c").unwrap().shown);
        assert!(!root.contains_key("d"));
    }

    #[test]
    fn uneven_tree_has_no_uniform_depth() {
        let mut root = Level::new();
        root.get_or_insert_with("leaf", HierarchicalNode::leaf);
        root.get_or_insert_with("branch", HierarchicalNode::branch)
            .subcolumn_mut()
            .unwrap()
            .get_or_insert_with("x", HierarchicalNode::leaf);
        assert_eq!(root.uniform_depth(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn tree_serializes_in_insertion_order_with_body_keys() {
        let mut root = Level::new();
        root.get_or_insert_with("Zed", HierarchicalNode::leaf).push_proposal(&key("P1"));
        root.get_or_insert_with("Alpha", HierarchicalNode::branch);
        let data = GroupedData::Tree { groups: root };
        let s = serde_json::to_string(&data).unwrap();
        assert_eq!(
            s,
            r#"{"groups":{"Zed":{"shown":false,"proposals":["P1"]},"Alpha":{"shown":false,"subcolumn":{}}}}"#
        );
        let back: GroupedData = serde_json::from_str(&s).unwrap();
        assert_eq!(back, data);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn flat_and_list_shapes_round_trip_through_untagged_enum() {
        let flat: GroupedData = serde_json::from_str(
            r#"{"groups":[{"all_proposal_ids":["P1"],"filtered_proposal_ids":[],"num_filtered_proposals":0,"name":"A"}]}"#,
        )
        .unwrap();
        assert!(matches!(flat, GroupedData::Flat { ref groups } if groups.len() == 1));
        let list: GroupedData = serde_json::from_str(r#"{"proposal_ids":["P1","P2"]}"#).unwrap();
        assert_eq!(list.data_var(), "proposal_ids");
    }
}
