//! crates/toc_core/src/columns.rs
//! Raw (unvalidated) table column descriptor, as written in a TOC manifest.
//! `toc_report::ColumnDef::try_from` turns it into a checked definition.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct ColumnSpec {
    pub heading: String,
    /// Direct reference to a proposal column.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    /// Computed value: a template rendered per row.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub template: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub link: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub right_aligned: bool,
}

impl ColumnSpec {
    pub fn direct(heading: impl Into<String>, name: impl Into<String>) -> Self {
        Self { heading: heading.into(), name: Some(name.into()), ..Self::default() }
    }

    pub fn template(heading: impl Into<String>, template: impl Into<String>) -> Self {
        Self { heading: heading.into(), template: Some(template.into()), ..Self::default() }
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

/// Raw formatter choice, as written in a TOC manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum FormatterSpec {
    /// One `* <toc line>` per proposal.
    #[default]
    WikiList,
    /// Sortable wiki table with one column per descriptor.
    WikiTable {
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        title_column: Option<String>,
        columns: Vec<ColumnSpec>,
    },
}
