// crates/toc_io/src/manifest.rs
//
// TOC manifest: which competition to read, the optional region table, and one
// definition per TOC to build.
//
// - Input paths are local. Relative paths resolve against the manifest's directory.
// - Anything with a scheme is rejected before touching the filesystem.
// - A region table is required as soon as one TOC is region-aware.
// - TOC names must be unique; they name the output artifacts.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toc_core::{FormatterSpec, ProposalKey, SortPolicy, TocName};

use crate::{looks_like_url, IoError, IoResult};

/// Name used when an annual-budget TOC does not set one.
pub const ANNUAL_BUDGET_TOC_NAME: &str = "Annual_Budgets";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TocKind {
    Generic,
    MultiLine,
    List,
    AnnualBudget,
    Geographic,
    RegionAwareGeographic,
}

impl TocKind {
    pub fn needs_region_table(self) -> bool {
        matches!(self, TocKind::RegionAwareGeographic)
    }
}

fn default_true() -> bool {
    true
}

/// One TOC as written in the manifest. Which fields matter depends on `kind`;
/// `toc_pipeline` checks the combination when it builds the `Toc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TocDefinition {
    pub kind: TocKind,
    #[serde(default)]
    pub name: Option<String>,
    /// Single grouping column (generic, multi_line, annual_budget).
    #[serde(default)]
    pub column: Option<String>,
    /// Several grouping columns (generic, multi_line).
    #[serde(default)]
    pub columns: Vec<String>,
    /// Equal-length column tuples (geographic kinds).
    #[serde(default)]
    pub column_sets: Vec<Vec<String>>,
    /// Declared groups, shown first and in this order.
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    #[serde(default)]
    pub sort: Option<SortPolicy>,
    #[serde(default = "default_true")]
    pub include_wiki_toc: bool,
    /// Restrict the TOC to these proposals instead of the whole competition.
    #[serde(default)]
    pub proposals: Option<Vec<ProposalKey>>,
    #[serde(default)]
    pub formatter: FormatterSpec,
}

impl TocDefinition {
    pub fn new(kind: TocKind) -> Self {
        Self {
            kind,
            name: None,
            column: None,
            columns: Vec::new(),
            column_sets: Vec::new(),
            groups: None,
            sort: None,
            include_wiki_toc: true,
            proposals: None,
            formatter: FormatterSpec::default(),
        }
    }

    /// The name the TOC and its artifacts go by.
    pub fn effective_name(&self) -> Option<&str> {
        match (&self.name, self.kind) {
            (Some(n), _) => Some(n.as_str()),
            (None, TocKind::AnnualBudget) => Some(ANNUAL_BUDGET_TOC_NAME),
            (None, _) => None,
        }
    }
}

/// External manifest accepted by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TocManifest {
    pub competition: String,
    #[serde(default)]
    pub region_table: Option<String>,
    pub tocs: Vec<TocDefinition>,
}

/// Manifest with paths resolved and checked to be existing files.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub competition: PathBuf,
    pub region_table: Option<PathBuf>,
    pub tocs: Vec<TocDefinition>,
}

// ---------- helpers ----------

fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn offline_check(field: &str, value: &str) -> IoResult<()> {
    if value.trim().is_empty() {
        return Err(IoError::Manifest(format!("field must not be empty: {field}")));
    }
    if looks_like_url(value) {
        return Err(IoError::Manifest(format!("path must be local (no scheme) for {field}: {value}")));
    }
    Ok(())
}

fn existing_file(field: &str, path: PathBuf) -> IoResult<PathBuf> {
    let meta = fs::metadata(&path).map_err(|e| IoError::Path(format!("cannot access {field} {}: {e}", path.display())))?;
    if !meta.is_file() {
        return Err(IoError::Manifest(format!("path is not a file for {field}: {}", path.display())));
    }
    Ok(path)
}

// ---------- validation ----------

/// Shape and path policy checks. No I/O.
pub fn validate_manifest(man: &TocManifest) -> IoResult<()> {
    offline_check("competition", &man.competition)?;
    if let Some(rt) = &man.region_table {
        offline_check("region_table", rt)?;
    }
    if man.tocs.is_empty() {
        return Err(IoError::Manifest("no tocs defined".into()));
    }

    let mut names = BTreeSet::new();
    for (i, def) in man.tocs.iter().enumerate() {
        let name = def
            .effective_name()
            .ok_or_else(|| IoError::Manifest(format!("tocs[{i}]: missing name")))?;
        TocName::try_from(name).map_err(|e| IoError::Manifest(format!("tocs[{i}]: {e}: {name:?}")))?;
        if !names.insert(name) {
            return Err(IoError::Manifest(format!("duplicate toc name: {name}")));
        }
        if def.kind.needs_region_table() && man.region_table.is_none() {
            return Err(IoError::Manifest(format!("toc {name} is region-aware but no region_table is set")));
        }
    }
    Ok(())
}

/// Resolve input paths against `base_dir` and require them to be files.
pub fn resolve_paths(base_dir: &Path, man: &TocManifest) -> IoResult<ResolvedManifest> {
    let competition = existing_file("competition", join_under(base_dir, &man.competition))?;
    let region_table = man
        .region_table
        .as_deref()
        .map(|rt| existing_file("region_table", join_under(base_dir, rt)))
        .transpose()?;
    Ok(ResolvedManifest { competition, region_table, tocs: man.tocs.clone() })
}

/// Read, validate and resolve the manifest at `path`.
pub fn load_manifest(path: &Path) -> IoResult<ResolvedManifest> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let man: TocManifest = serde_json::from_str(&text)?;
    validate_manifest(&man)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_paths(base, &man)
}
