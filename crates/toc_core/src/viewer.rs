//! crates/toc_core/src/viewer.rs
//! Render-phase input: what one viewer may see. Supplied by the rendering
//! side after permissions are resolved; the build phase never touches it.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::ProposalKey;

/// Column → value, restricted to the columns the viewer may see.
pub type ProposalFields = BTreeMap<String, String>;

/// Proposals a viewer may access, keyed by proposal key.
pub type AccessSet = BTreeMap<ProposalKey, ProposalFields>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewerContext {
    /// Named accessible sets; a plan consults the one named after its competition.
    #[cfg_attr(feature = "serde", serde(default))]
    pub proposal_sets: BTreeMap<String, AccessSet>,
    /// Pre-rendered one-line summaries used by list formatters.
    #[cfg_attr(feature = "serde", serde(default))]
    pub toc_lines: BTreeMap<ProposalKey, String>,
}

impl ViewerContext {
    pub fn access_set(&self, name: &str) -> Option<&AccessSet> {
        self.proposal_sets.get(name)
    }

    /// Builder: grant access to `key` in set `set` with the given visible fields.
    pub fn grant<I, C, V>(mut self, set: &str, key: ProposalKey, fields: I) -> Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<String>,
        V: Into<String>,
    {
        let visible = fields.into_iter().map(|(c, v)| (c.into(), v.into())).collect();
        self.proposal_sets.entry(set.to_owned()).or_default().insert(key, visible);
        self
    }

    pub fn with_toc_line(mut self, key: ProposalKey, line: impl Into<String>) -> Self {
        self.toc_lines.insert(key, line.into());
        self
    }
}
