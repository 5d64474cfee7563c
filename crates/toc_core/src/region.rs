//! crates/toc_core/src/region.rs
//! Country → (subregion, region) lookup used by region enrichment.
//! Loading from disk lives in `toc_io::loader`.

use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionEntry {
    pub subregion: String,
    pub region: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionTable {
    by_country: BTreeMap<String, RegionEntry>,
}

impl RegionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later rows for the same country replace earlier ones.
    pub fn insert(&mut self, country: impl Into<String>, subregion: impl Into<String>, region: impl Into<String>) {
        self.by_country.insert(
            country.into(),
            RegionEntry { subregion: subregion.into(), region: region.into() },
        );
    }

    pub fn lookup(&self, country: &str) -> Option<&RegionEntry> {
        self.by_country.get(country)
    }

    pub fn len(&self) -> usize {
        self.by_country.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }
}

impl<C, S, R> FromIterator<(C, S, R)> for RegionTable
where
    C: Into<String>,
    S: Into<String>,
    R: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, S, R)>>(iter: I) -> Self {
        let mut t = RegionTable::new();
        for (c, s, r) in iter {
            t.insert(c, s, r);
        }
        t
    }
}
