// crates/toc_report/src/plan.rs
//
// The render plan: a small tagged tree, built once per TOC and interpreted once
// per viewer. It names columns, the grouped-data variable and the accessible
// proposal set, never concrete data.
//
// Scoping rules enforced by the interpreter:
// - `GroupName`, `GroupCount`, `IfGroupNonEmpty`, `ForEachFilteredProposal`
//   need an enclosing `ForEachGroup`.
// - `ForEachLeafProposal`, `AncestorHeadings`, `IfLeafShown` need an enclosing
//   `ForEachLeafNode`, which walks the tree depth first whatever its depth.
// - Proposal nodes (`TocLine`, `Field`, `IfField`, `Computed`, `ProposalLink`,
//   `IfAccessible`) need an enclosing proposal loop.

use serde::Serialize;
use toc_core::SortPolicy;

use crate::formatter::Computed;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Node {
    Text { text: String },

    // ----- flat -----
    /// Re-derive every group's filtered ids and count from the accessible set.
    FilterAndCount,
    ForEachGroup { order: SortPolicy, body: Vec<Node> },
    IfGroupNonEmpty { body: Vec<Node> },
    GroupName,
    GroupCount,
    ForEachFilteredProposal { body: Vec<Node> },

    // ----- hierarchical -----
    /// Run `body` once per leaf, in tree order, with the path to that leaf bound.
    ForEachLeafNode { body: Vec<Node> },
    ForEachLeafProposal { body: Vec<Node> },
    /// Emit a heading for every not-yet-shown node on the current path (level d
    /// uses d+1 `=`), top down, marking each shown. `on_leaf_open` runs right
    /// after the leaf's own heading.
    AncestorHeadings { on_leaf_open: Vec<Node> },
    IfLeafShown { body: Vec<Node> },

    // ----- list -----
    ForEachListedProposal { body: Vec<Node> },

    // ----- per proposal -----
    IfAccessible { body: Vec<Node> },
    TocLine,
    Field { column: String },
    IfField { column: String, body: Vec<Node> },
    Computed { value: Computed },
    ProposalLink { title_column: String, body: Vec<Node> },

    // ----- per section -----
    IfColumnVisible { column: String, body: Vec<Node> },
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text { text: s.into() }
    }
}

/// Shape of the grouped data a plan is written for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TocShape {
    Flat { include_wiki_toc: bool },
    Hierarchical { depth: usize },
    List,
}

impl TocShape {
    /// Name the grouped data is exposed under.
    pub fn data_var(self) -> &'static str {
        match self {
            TocShape::Flat { .. } | TocShape::Hierarchical { .. } => "groups",
            TocShape::List => "proposal_ids",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderSpecification {
    pub shape: TocShape,
    pub data_var: String,
    /// Name of the viewer's accessible proposal set (the competition name).
    pub access_var: String,
    pub body: Vec<Node>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn nodes_serialize_with_op_tag() {
        let n = Node::ForEachGroup {
            order: SortPolicy::ByCount,
            body: vec![Node::IfGroupNonEmpty { body: vec![Node::GroupName, Node::text("\n")] }],
        };
        assert_json_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({
                "op": "for_each_group",
                "order": "by_count",
                "body": [
                    { "op": "if_group_non_empty", "body": [ { "op": "group_name" }, { "op": "text", "text": "\n" } ] }
                ]
            })
        );
    }

    #[test]
    fn computed_nodes_name_their_source() {
        let n = Node::Computed { value: Computed::Template("{{ key }}".into()) };
        assert_json_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "op": "computed", "value": { "template": "{{ key }}" } })
        );
    }

    #[test]
    fn shape_data_var() {
        assert_eq!(TocShape::Flat { include_wiki_toc: true }.data_var(), "groups");
        assert_eq!(TocShape::Hierarchical { depth: 3 }.data_var(), "groups");
        assert_eq!(TocShape::List.data_var(), "proposal_ids");
    }
}
