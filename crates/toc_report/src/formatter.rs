// crates/toc_report/src/formatter.rs
//
// Proposal formatters: how one proposal row, and the section around a list of
// rows, appear in a rendered TOC. Formatters emit plan fragments (`Node`s), not
// text; the interpreter binds the current proposal and the viewer's
// accessible set when the fragment runs.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use toc_core::{ColumnSpec, FormatterSpec, ProposalFields, ProposalKey};

use crate::plan::Node;
use crate::ReportError;

/// Column read by the table link wrapper when none is configured.
pub const DEFAULT_TITLE_COLUMN: &str = "MediaWiki Title";

const TABLE_OPEN: &str =
    "{| class=\"wikitable bs-exportable exportable sortable\" style=\"border-style: solid; border-color: gray; border-width: 5px;\"\n";
const TABLE_CLOSE: &str = "|}\n";

// ------------------------- computed cells -------------------------

/// What a computed cell sees: the proposal key and the fields visible to the
/// current viewer.
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    pub key: &'a ProposalKey,
    pub fields: &'a ProposalFields,
}

impl<'a> RowView<'a> {
    pub fn field(&self, column: &str) -> Option<&'a str> {
        self.fields.get(column).map(String::as_str)
    }
}

pub type CellFn = Arc<dyn Fn(&RowView<'_>) -> String + Send + Sync>;

/// A row-level computed value. Closures serve library callers; templates
/// (minijinja, with `key` and `row` in scope) serve manifest-configured TOCs.
/// Either way the computation handles absent fields itself.
#[derive(Clone)]
pub enum Computed {
    Template(String),
    Func { label: String, f: CellFn },
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computed::Template(src) => f.debug_tuple("Template").field(src).finish(),
            Computed::Func { label, .. } => f.debug_struct("Func").field("label", label).finish_non_exhaustive(),
        }
    }
}

impl PartialEq for Computed {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Computed::Template(a), Computed::Template(b)) => a == b,
            (Computed::Func { label: a, f: fa }, Computed::Func { label: b, f: fb }) => a == b && Arc::ptr_eq(fa, fb),
            _ => false,
        }
    }
}

impl Eq for Computed {}

impl Serialize for Computed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Computed::Template(src) => map.serialize_entry("template", src)?,
            Computed::Func { label, .. } => map.serialize_entry("function", label)?,
        }
        map.end()
    }
}

// ------------------------- column definitions -------------------------

/// Where a table cell's value comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// A proposal column; rows are guarded on the viewer seeing that field.
    Direct(String),
    /// Computed per row; never guarded.
    Computed(Computed),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub heading: String,
    pub source: ColumnSource,
    pub link: bool,
    pub right_aligned: bool,
}

impl ColumnDef {
    pub fn direct(heading: impl Into<String>, column: impl Into<String>) -> Self {
        Self::with_source(heading, ColumnSource::Direct(column.into()))
    }

    pub fn template(heading: impl Into<String>, source: impl Into<String>) -> Self {
        Self::with_source(heading, ColumnSource::Computed(Computed::Template(source.into())))
    }

    pub fn computed<F>(heading: impl Into<String>, label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RowView<'_>) -> String + Send + Sync + 'static,
    {
        Self::with_source(heading, ColumnSource::Computed(Computed::Func { label: label.into(), f: Arc::new(f) }))
    }

    fn with_source(heading: impl Into<String>, source: ColumnSource) -> Self {
        Self { heading: heading.into(), source, link: false, right_aligned: false }
    }

    pub fn linked(mut self) -> Self {
        self.link = true;
        self
    }

    pub fn right_aligned(mut self) -> Self {
        self.right_aligned = true;
        self
    }
}

impl TryFrom<&ColumnSpec> for ColumnDef {
    type Error = ReportError;

    fn try_from(spec: &ColumnSpec) -> Result<Self, Self::Error> {
        let source = match (&spec.name, &spec.template) {
            (Some(name), None) => ColumnSource::Direct(name.clone()),
            (None, Some(src)) => ColumnSource::Computed(Computed::Template(src.clone())),
            (Some(_), Some(_)) => {
                return Err(ReportError::ColumnDefinition {
                    heading: spec.heading.clone(),
                    problem: "both a column name and a computed template were given",
                })
            }
            (None, None) => {
                return Err(ReportError::ColumnDefinition {
                    heading: spec.heading.clone(),
                    problem: "neither a column name nor a computed template was given",
                })
            }
        };
        Ok(ColumnDef {
            heading: spec.heading.clone(),
            source,
            link: spec.link,
            right_aligned: spec.right_aligned,
        })
    }
}

// ------------------------- formatters -------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableFormatter {
    columns: Vec<ColumnDef>,
    title_column: String,
}

impl TableFormatter {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns, title_column: DEFAULT_TITLE_COLUMN.to_string() }
    }

    pub fn with_title_column(mut self, column: impl Into<String>) -> Self {
        self.title_column = column.into();
        self
    }

    /// Validate raw descriptors; the first bad one is reported.
    pub fn from_specs(specs: &[ColumnSpec]) -> Result<Self, ReportError> {
        let columns = specs.iter().map(ColumnDef::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(columns))
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn prefix(&self) -> Vec<Node> {
        let mut nodes = vec![Node::text(TABLE_OPEN)];
        for col in &self.columns {
            let heading = Node::text(format!("! {}\n", col.heading));
            match &col.source {
                // Header visibility follows the viewer's first accessible proposal.
                ColumnSource::Direct(name) => nodes.push(Node::IfColumnVisible { column: name.clone(), body: vec![heading] }),
                ColumnSource::Computed(_) => nodes.push(heading),
            }
        }
        nodes
    }

    fn row(&self) -> Vec<Node> {
        let mut nodes = vec![Node::text("|-\n")];
        for col in &self.columns {
            let style = if col.right_aligned {
                "| style='vertical-align:top;text-align:right;' |"
            } else {
                "| style='vertical-align:top;' |"
            };
            let value = match &col.source {
                ColumnSource::Direct(name) => Node::Field { column: name.clone() },
                ColumnSource::Computed(c) => Node::Computed { value: c.clone() },
            };
            let value = if col.link {
                Node::ProposalLink { title_column: self.title_column.clone(), body: vec![value] }
            } else {
                value
            };
            let cell = vec![Node::text(style), value, Node::text("\n")];
            match &col.source {
                ColumnSource::Direct(name) => nodes.push(Node::IfField { column: name.clone(), body: cell }),
                ColumnSource::Computed(_) => nodes.extend(cell),
            }
        }
        nodes
    }
}

/// Closed set of formatters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "table", rename_all = "snake_case")]
pub enum ProposalFormatter {
    /// `* <toc line>` per proposal; no section wrapper.
    #[default]
    WikiList,
    WikiTable(TableFormatter),
}

impl ProposalFormatter {
    /// Opening of a section holding a list of proposals.
    pub fn prefix(&self) -> Vec<Node> {
        match self {
            ProposalFormatter::WikiList => Vec::new(),
            ProposalFormatter::WikiTable(t) => t.prefix(),
        }
    }

    /// One proposal row; runs with the current proposal bound.
    pub fn format_proposal(&self) -> Vec<Node> {
        match self {
            ProposalFormatter::WikiList => vec![Node::text("* "), Node::TocLine, Node::text("\n")],
            ProposalFormatter::WikiTable(t) => t.row(),
        }
    }

    /// Closing of a section.
    pub fn suffix(&self) -> Vec<Node> {
        match self {
            ProposalFormatter::WikiList => Vec::new(),
            ProposalFormatter::WikiTable(_) => vec![Node::text(TABLE_CLOSE)],
        }
    }
}

impl TryFrom<&FormatterSpec> for ProposalFormatter {
    type Error = ReportError;

    fn try_from(spec: &FormatterSpec) -> Result<Self, Self::Error> {
        match spec {
            FormatterSpec::WikiList => Ok(ProposalFormatter::WikiList),
            FormatterSpec::WikiTable { title_column, columns } => {
                let mut table = TableFormatter::from_specs(columns)?;
                if let Some(col) = title_column {
                    table = table.with_title_column(col.clone());
                }
                Ok(ProposalFormatter::WikiTable(table))
            }
        }
    }
}
