//! Loaders for the three data inputs: competition proposals (JSON), the country
//! region table (CSV) and a viewer context (JSON). Local files only.

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use toc_core::{CompetitionData, RegionTable, ViewerContext};
use tracing::debug;

use crate::{IoError, IoResult};

fn read_text(path: &Path) -> IoResult<String> {
    fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))
}

// ----------------------------- Competition -----------------------------

/// Load `{ "name": ..., "proposals": [ { "key": ..., "cells": {..} }, ... ] }`.
/// Proposal order in the file is the competition's canonical order.
pub fn load_competition(path: &Path) -> IoResult<CompetitionData> {
    let competition: CompetitionData = serde_json::from_str(&read_text(path)?)?;
    validate_competition(&competition)?;
    debug!(path = %path.display(), proposals = competition.proposals.len(), "competition loaded");
    Ok(competition)
}

fn validate_competition(c: &CompetitionData) -> IoResult<()> {
    if c.name.trim().is_empty() {
        return Err(IoError::Invalid("competition name must not be empty".into()));
    }
    let mut seen = BTreeSet::new();
    for p in &c.proposals {
        if !seen.insert(&p.key) {
            return Err(IoError::Invalid(format!("duplicate proposal key {} in {}", p.key, c.name)));
        }
    }
    Ok(())
}

// ----------------------------- Region table -----------------------------

/// Load the country lookup table: header row skipped, then
/// `country, subregion, region` per row. Extra columns are ignored, blank
/// lines and rows with a blank country are skipped.
pub fn load_region_table(path: &Path) -> IoResult<RegionTable> {
    let file = fs::File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let table = read_region_table(file)?;
    debug!(path = %path.display(), countries = table.len(), "region table loaded");
    Ok(table)
}

pub fn read_region_table<R: Read>(reader: R) -> IoResult<RegionTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = RegionTable::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = record.position().map_or(i as u64 + 2, |p| p.line());
        let (Some(country), Some(subregion), Some(region)) = (record.get(0), record.get(1), record.get(2)) else {
            if record.iter().all(str::is_empty) {
                continue;
            }
            return Err(IoError::Csv(format!("row {row}: expected country, subregion, region")));
        };
        if country.is_empty() {
            continue;
        }
        table.insert(country, subregion, region);
    }
    Ok(table)
}

// ----------------------------- Viewer -----------------------------

/// Load a viewer context: named accessible proposal sets and optional toc lines.
pub fn load_viewer(path: &Path) -> IoResult<ViewerContext> {
    let viewer: ViewerContext = serde_json::from_str(&read_text(path)?)?;
    debug!(path = %path.display(), sets = viewer.proposal_sets.len(), "viewer context loaded");
    Ok(viewer)
}
