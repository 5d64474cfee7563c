// crates/toc_report/src/synth.rs
//
// Plan synthesis: shape + formatter + sort policy → RenderSpecification.
// Nothing here reads proposal data; a plan is fixed at build time and reused
// for every viewer.

use toc_core::SortPolicy;
use tracing::debug;

use crate::formatter::ProposalFormatter;
use crate::plan::{Node, RenderSpecification, TocShape};
use crate::ReportError;

const WIKI_TOC_MARKER: &str = "__TOC__\n";

/// Build the render plan for one TOC.
///
/// `access_var` names the viewer's accessible proposal set; it is the
/// competition name and therefore must not be empty. `sort` only affects flat
/// shapes.
pub fn synthesize(
    shape: TocShape,
    formatter: &ProposalFormatter,
    sort: SortPolicy,
    access_var: &str,
) -> Result<RenderSpecification, ReportError> {
    if access_var.is_empty() {
        return Err(ReportError::Shape("accessible set name must not be empty".into()));
    }
    let body = match shape {
        TocShape::Flat { include_wiki_toc } => flat_body(formatter, sort, include_wiki_toc),
        TocShape::Hierarchical { depth: 0 } => {
            return Err(ReportError::Shape("hierarchical plan needs at least one level".into()))
        }
        TocShape::Hierarchical { .. } => hierarchical_body(formatter),
        TocShape::List => list_body(formatter),
    };
    debug!(shape = ?shape, sort = ?sort, top_nodes = body.len(), "render plan synthesized");
    Ok(RenderSpecification {
        shape,
        data_var: shape.data_var().to_string(),
        access_var: access_var.to_string(),
        body,
    })
}

/// A synthesizer bound to one formatter and sort policy, for callers that
/// build several plans with the same presentation.
#[derive(Clone, Debug, Default)]
pub struct TemplateSynthesizer {
    formatter: ProposalFormatter,
    sort: SortPolicy,
}

impl TemplateSynthesizer {
    pub fn new(formatter: ProposalFormatter, sort: SortPolicy) -> Self {
        Self { formatter, sort }
    }

    pub fn formatter(&self) -> &ProposalFormatter {
        &self.formatter
    }

    pub fn sort(&self) -> SortPolicy {
        self.sort
    }

    pub fn synthesize(&self, shape: TocShape, access_var: &str) -> Result<RenderSpecification, ReportError> {
        synthesize(shape, &self.formatter, self.sort, access_var)
    }
}

// Counting runs for every group before any is emitted; BY_COUNT depends on it.
fn flat_body(formatter: &ProposalFormatter, sort: SortPolicy, include_wiki_toc: bool) -> Vec<Node> {
    let mut section = vec![
        Node::text("<div id='"),
        Node::GroupName,
        Node::text("'></div>\n= "),
        Node::GroupName,
        Node::text(" ("),
        Node::GroupCount,
        Node::text(") =\n"),
    ];
    section.extend(formatter.prefix());
    section.push(Node::ForEachFilteredProposal { body: formatter.format_proposal() });
    section.extend(formatter.suffix());

    let mut body = Vec::new();
    if include_wiki_toc {
        body.push(Node::text(WIKI_TOC_MARKER));
    }
    body.push(Node::FilterAndCount);
    body.push(Node::ForEachGroup { order: sort, body: vec![Node::IfGroupNonEmpty { body: section }] });
    body
}

// For each accessible proposal of a leaf: headings of every not-yet-shown
// ancestor (the section prefix right after the leaf's own heading), then the
// row. The suffix closes a leaf only if one of its rows was emitted. The walk
// is the same for every depth.
fn hierarchical_body(formatter: &ProposalFormatter) -> Vec<Node> {
    let mut row = vec![Node::AncestorHeadings { on_leaf_open: formatter.prefix() }];
    row.extend(formatter.format_proposal());

    let mut leaf = vec![Node::ForEachLeafProposal { body: vec![Node::IfAccessible { body: row }] }];
    let suffix = formatter.suffix();
    if !suffix.is_empty() {
        leaf.push(Node::IfLeafShown { body: suffix });
    }
    vec![Node::text(WIKI_TOC_MARKER), Node::ForEachLeafNode { body: leaf }]
}

fn list_body(formatter: &ProposalFormatter) -> Vec<Node> {
    let mut body = formatter.prefix();
    body.push(Node::ForEachListedProposal { body: vec![Node::IfAccessible { body: formatter.format_proposal() }] });
    body.extend(formatter.suffix());
    body
}
