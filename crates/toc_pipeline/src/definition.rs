// crates/toc_pipeline/src/definition.rs
//
// Manifest definition → Toc. The manifest format is permissive (every field is
// optional); this is where a definition is checked against its kind.

use toc_core::RegionTable;
use toc_io::manifest::{TocDefinition, TocKind};

use crate::budget::ANNUAL_BUDGET_TOC_NAME;
use crate::toc::Toc;
use crate::PipelineError;

fn reject(name: &str, problem: impl Into<String>) -> PipelineError {
    PipelineError::Definition { toc: name.to_string(), problem: problem.into() }
}

/// `column` and `columns` together, in that order.
fn flat_columns(def: &TocDefinition) -> Vec<String> {
    def.column.iter().chain(def.columns.iter()).cloned().collect()
}

fn check_fields(name: &str, def: &TocDefinition) -> Result<(), PipelineError> {
    let flat = matches!(def.kind, TocKind::Generic | TocKind::MultiLine | TocKind::AnnualBudget);
    let tree = matches!(def.kind, TocKind::Geographic | TocKind::RegionAwareGeographic);

    if !flat && (def.column.is_some() || !def.columns.is_empty()) {
        return Err(reject(name, "column/columns only apply to flat tocs"));
    }
    if !tree && !def.column_sets.is_empty() {
        return Err(reject(name, "column_sets only apply to geographic tocs"));
    }
    if matches!(def.kind, TocKind::AnnualBudget) && (def.groups.is_some() || !def.columns.is_empty()) {
        return Err(reject(name, "annual_budget takes a single column and fixed groups"));
    }
    if !flat && (def.groups.is_some() || def.sort.is_some()) {
        return Err(reject(name, "groups/sort only apply to flat tocs"));
    }
    Ok(())
}

/// Build an unbuilt `Toc` from its manifest definition.
pub fn toc_from_definition(def: &TocDefinition, regions: Option<&RegionTable>) -> Result<Toc, PipelineError> {
    let name = def.effective_name().ok_or_else(|| reject("<unnamed>", "missing name"))?;
    check_fields(name, def)?;

    let mut toc = match def.kind {
        TocKind::Generic => Toc::generic(name, flat_columns(def))?,
        TocKind::MultiLine => Toc::multi_line(name, flat_columns(def))?,
        TocKind::List => Toc::list(name)?,
        TocKind::AnnualBudget => {
            if name != ANNUAL_BUDGET_TOC_NAME {
                return Err(reject(name, format!("annual_budget tocs are always named {ANNUAL_BUDGET_TOC_NAME}")));
            }
            let column = def.column.as_deref().ok_or_else(|| reject(name, "annual_budget needs a column"))?;
            Toc::annual_budget(column)?
        }
        TocKind::Geographic => Toc::geographic(name, def.column_sets.clone())?,
        TocKind::RegionAwareGeographic => {
            let table = regions.ok_or_else(|| reject(name, "region-aware toc without a region table"))?;
            Toc::region_aware(name, def.column_sets.clone(), table.clone())?
        }
    };

    if let Some(groups) = &def.groups {
        toc = toc.with_groups(groups.iter().cloned())?;
    }
    if let Some(sort) = def.sort {
        toc = toc.with_sort(sort);
    }
    toc = toc.with_wiki_toc(def.include_wiki_toc).with_formatter_spec(def.formatter.clone());
    if let Some(keys) = &def.proposals {
        toc = toc.restrict_to(keys.iter().cloned());
    }
    Ok(toc)
}
