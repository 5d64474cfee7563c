// crates/toc_report/src/render.rs
//
// Per-viewer plan interpreter. The caller's grouped data is never touched: a
// run clones it, clears every render-time field, and only then filters,
// counts and marks headings as shown. Two runs with the same inputs give the
// same text regardless of what ran before.

use minijinja::{context, Environment};
use toc_core::{AccessSet, Group, GroupedData, HierarchicalNode, Level, ProposalFields, ProposalKey, ViewerContext};
use tracing::debug;

use crate::formatter::{Computed, RowView};
use crate::plan::{Node, RenderSpecification, TocShape};
use crate::ReportError;

/// Render `spec` for one viewer.
pub fn render(spec: &RenderSpecification, data: &GroupedData, viewer: &ViewerContext) -> Result<String, ReportError> {
    check_shape(spec, data)?;
    let access = viewer
        .access_set(&spec.access_var)
        .ok_or_else(|| ReportError::UnknownAccessSet(spec.access_var.clone()))?;

    let mut data = data.clone();
    data.reset_render_state();

    let mut run = Interpreter {
        data,
        access,
        toc_lines: &viewer.toc_lines,
        env: Environment::new(),
        path: Vec::new(),
        group: None,
        proposal: None,
    };
    let mut out = String::new();
    run.exec(&spec.body, &mut out)?;

    debug!(access_set = %spec.access_var, accessible = access.len(), bytes = out.len(), "plan rendered");
    Ok(out)
}

fn check_shape(spec: &RenderSpecification, data: &GroupedData) -> Result<(), ReportError> {
    if spec.data_var != data.data_var() {
        return Err(ReportError::Shape(format!(
            "plan reads '{}' but the data provides '{}'",
            spec.data_var,
            data.data_var()
        )));
    }
    match (spec.shape, data) {
        (TocShape::Flat { .. }, GroupedData::Flat { .. }) | (TocShape::List, GroupedData::List { .. }) => Ok(()),
        (TocShape::Hierarchical { depth }, GroupedData::Tree { groups }) => match groups.uniform_depth() {
            Some(0) => Ok(()),
            Some(d) if d == depth => Ok(()),
            Some(d) => Err(ReportError::Shape(format!("plan expects a tree of depth {depth}, data has depth {d}"))),
            None => Err(ReportError::Shape("tree leaves are not all at the same depth".into())),
        },
        (shape, _) => Err(ReportError::Shape(format!("{shape:?} plan cannot render this grouped data"))),
    }
}

struct Interpreter<'v> {
    data: GroupedData,
    access: &'v AccessSet,
    toc_lines: &'v std::collections::BTreeMap<ProposalKey, String>,
    env: Environment<'static>,
    /// Node keys from the root down to the leaf being walked.
    path: Vec<String>,
    group: Option<usize>,
    proposal: Option<ProposalKey>,
}

impl<'v> Interpreter<'v> {
    fn exec(&mut self, nodes: &[Node], out: &mut String) -> Result<(), ReportError> {
        for node in nodes {
            self.step(node, out)?;
        }
        Ok(())
    }

    fn step(&mut self, node: &Node, out: &mut String) -> Result<(), ReportError> {
        match node {
            Node::Text { text } => out.push_str(text),

            // ----- flat -----
            Node::FilterAndCount => self.filter_and_count()?,
            Node::ForEachGroup { order, body } => {
                let indices = order.order(self.groups("for_each_group")?);
                let saved = self.group;
                for i in indices {
                    self.group = Some(i);
                    self.exec(body, out)?;
                }
                self.group = saved;
            }
            Node::IfGroupNonEmpty { body } => {
                if self.current_group("if_group_non_empty")?.num_filtered_proposals > 0 {
                    self.exec(body, out)?;
                }
            }
            Node::GroupName => out.push_str(&self.current_group("group_name")?.name),
            Node::GroupCount => out.push_str(&self.current_group("group_count")?.num_filtered_proposals.to_string()),
            Node::ForEachFilteredProposal { body } => {
                let ids = self.current_group("for_each_filtered_proposal")?.filtered_proposal_ids.clone();
                self.for_each_proposal(ids, body, out)?;
            }

            // ----- hierarchical -----
            Node::ForEachLeafNode { body } => {
                if !self.path.is_empty() {
                    return Err(ReportError::Scope("for_each_leaf_node"));
                }
                self.walk_leaves(body, out)?;
            }
            Node::ForEachLeafProposal { body } => {
                let leaf = self.leaf_depth("for_each_leaf_proposal")?;
                let ids = self
                    .node(leaf, "for_each_leaf_proposal")?
                    .proposals()
                    .ok_or_else(|| ReportError::Shape("leaf loop reached a branch node".into()))?
                    .to_vec();
                self.for_each_proposal(ids, body, out)?;
            }
            Node::AncestorHeadings { on_leaf_open } => {
                let leaf = self.leaf_depth("ancestor_headings")?;
                for depth in 0..=leaf {
                    let node = self.node_mut(depth, "ancestor_headings")?;
                    if std::mem::replace(&mut node.shown, true) {
                        continue;
                    }
                    let marks = "=".repeat(depth + 1);
                    out.push_str(&format!("{marks} {} {marks}\n", self.path[depth]));
                    if depth == leaf {
                        self.exec(on_leaf_open, out)?;
                    }
                }
            }
            Node::IfLeafShown { body } => {
                let leaf = self.leaf_depth("if_leaf_shown")?;
                if self.node(leaf, "if_leaf_shown")?.shown {
                    self.exec(body, out)?;
                }
            }

            // ----- list -----
            Node::ForEachListedProposal { body } => {
                let GroupedData::List { proposal_ids } = &self.data else {
                    return Err(ReportError::Shape("listed proposal loop needs list data".into()));
                };
                let ids = proposal_ids.clone();
                self.for_each_proposal(ids, body, out)?;
            }

            // ----- per proposal -----
            Node::IfAccessible { body } => {
                let visible = self.access.contains_key(self.current_proposal("if_accessible")?);
                if visible {
                    self.exec(body, out)?;
                }
            }
            Node::TocLine => {
                let key = self.current_proposal("toc_line")?;
                let line = self.toc_lines.get(key).map_or(key.as_str(), String::as_str);
                out.push_str(line);
            }
            Node::Field { column } => {
                if let Some(value) = self.visible_fields("field")?.and_then(|f| f.get(column)) {
                    out.push_str(value);
                }
            }
            Node::IfField { column, body } => {
                let present = self.visible_fields("if_field")?.is_some_and(|f| f.contains_key(column));
                if present {
                    self.exec(body, out)?;
                }
            }
            Node::Computed { value } => {
                let text = self.compute(value)?;
                out.push_str(&text);
            }
            Node::ProposalLink { title_column, body } => {
                let title = self
                    .visible_fields("proposal_link")?
                    .and_then(|f| f.get(title_column))
                    .filter(|t| !t.trim().is_empty())
                    .cloned();
                let mut inner = String::new();
                self.exec(body, &mut inner)?;
                match title {
                    Some(t) => out.push_str(&format!("[[{t}|{inner}]]")),
                    None => out.push_str(&inner),
                }
            }

            // ----- per section -----
            Node::IfColumnVisible { column, body } => {
                let visible = self.access.values().next().map_or(true, |f| f.contains_key(column));
                if visible {
                    self.exec(body, out)?;
                }
            }
        }
        Ok(())
    }

    fn for_each_proposal(&mut self, ids: Vec<ProposalKey>, body: &[Node], out: &mut String) -> Result<(), ReportError> {
        let saved = self.proposal.take();
        for id in ids {
            self.proposal = Some(id);
            self.exec(body, out)?;
        }
        self.proposal = saved;
        Ok(())
    }

    /// Depth-first over the level at the current path; `body` runs at each leaf.
    fn walk_leaves(&mut self, body: &[Node], out: &mut String) -> Result<(), ReportError> {
        let children: Vec<(String, bool)> = self
            .level_at_path()?
            .iter()
            .map(|(key, node)| (key.to_owned(), node.subcolumn().is_some()))
            .collect();
        for (key, branch) in children {
            self.path.push(key);
            let res = if branch { self.walk_leaves(body, out) } else { self.exec(body, out) };
            self.path.pop();
            res?;
        }
        Ok(())
    }

    fn filter_and_count(&mut self) -> Result<(), ReportError> {
        let access = self.access;
        let GroupedData::Flat { groups } = &mut self.data else {
            return Err(ReportError::Shape("filter_and_count needs flat groups".into()));
        };
        for g in groups.iter_mut() {
            g.filtered_proposal_ids = g.all_proposal_ids.iter().filter(|k| access.contains_key(*k)).cloned().collect();
            g.num_filtered_proposals = g.filtered_proposal_ids.len() as u64;
        }
        Ok(())
    }

    fn compute(&self, value: &Computed) -> Result<String, ReportError> {
        let key = self.current_proposal("computed")?;
        let empty = ProposalFields::new();
        let fields = self.access.get(key).unwrap_or(&empty);
        match value {
            Computed::Template(src) => self
                .env
                .render_str(src, context! { key => key.as_str(), row => fields })
                .map_err(|e| ReportError::Template(e.to_string())),
            Computed::Func { f, .. } => Ok(f(&RowView { key, fields })),
        }
    }

    // ----- lookups -----

    fn groups(&self, op: &'static str) -> Result<&[Group], ReportError> {
        match &self.data {
            GroupedData::Flat { groups } => Ok(groups),
            _ => Err(ReportError::Shape(format!("{op} needs flat groups"))),
        }
    }

    fn current_group(&self, op: &'static str) -> Result<&Group, ReportError> {
        let i = self.group.ok_or(ReportError::Scope(op))?;
        self.groups(op)?.get(i).ok_or(ReportError::Scope(op))
    }

    fn current_proposal(&self, op: &'static str) -> Result<&ProposalKey, ReportError> {
        self.proposal.as_ref().ok_or(ReportError::Scope(op))
    }

    /// Fields of the current proposal the viewer may see; `None` when the
    /// proposal is not accessible at all.
    fn visible_fields(&self, op: &'static str) -> Result<Option<&'v ProposalFields>, ReportError> {
        let key = self.current_proposal(op)?;
        Ok(self.access.get(key))
    }

    fn tree(&self) -> Result<&Level, ReportError> {
        match &self.data {
            GroupedData::Tree { groups } => Ok(groups),
            _ => Err(ReportError::Shape("node loop needs hierarchical groups".into())),
        }
    }

    fn level_at_path(&self) -> Result<&Level, ReportError> {
        match self.path.len() {
            0 => self.tree(),
            n => self
                .node(n - 1, "for_each_leaf_node")?
                .subcolumn()
                .ok_or_else(|| ReportError::Shape("tree walk went below a leaf".into())),
        }
    }

    fn leaf_depth(&self, op: &'static str) -> Result<usize, ReportError> {
        self.path.len().checked_sub(1).ok_or(ReportError::Scope(op))
    }

    fn node(&self, depth: usize, op: &'static str) -> Result<&HierarchicalNode, ReportError> {
        let path = self.path.get(..=depth).ok_or(ReportError::Scope(op))?;
        let (last, parents) = path.split_last().ok_or(ReportError::Scope(op))?;
        let mut level = self.tree()?;
        for key in parents {
            level = level.get(key).and_then(HierarchicalNode::subcolumn).ok_or_else(|| stale(key))?;
        }
        level.get(last).ok_or_else(|| stale(last))
    }

    fn node_mut(&mut self, depth: usize, op: &'static str) -> Result<&mut HierarchicalNode, ReportError> {
        let path = self.path.get(..=depth).ok_or(ReportError::Scope(op))?;
        let GroupedData::Tree { groups } = &mut self.data else {
            return Err(ReportError::Shape(format!("{op} needs hierarchical groups")));
        };
        walk_mut(groups, path).ok_or_else(|| stale(path.last().map_or("", String::as_str)))
    }
}

fn walk_mut<'a>(mut level: &'a mut Level, path: &[String]) -> Option<&'a mut HierarchicalNode> {
    let (last, parents) = path.split_last()?;
    for key in parents {
        level = level.get_mut(key)?.subcolumn_mut()?;
    }
    level.get_mut(last)
}

fn stale(key: &str) -> ReportError {
    ReportError::Shape(format!("node '{key}' vanished during rendering"))
}
