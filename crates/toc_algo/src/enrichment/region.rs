// crates/toc_algo/src/enrichment/region.rs
//
// Region enrichment: wrap each top-level (country) node of a built hierarchical
// grouping in two synthetic levels, region → subregion → country.
//
// - Countries missing from the lookup table are dropped, with one warning per
//   distinct country name.
// - The result is not re-sorted: regions and subregions appear in the order
//   their first country is met, countries in the order of the input tree.
// - Applying it twice nests two more levels; callers run it once per build.

use std::collections::BTreeSet;

use toc_core::{HierarchicalNode, Level, RegionTable};
use tracing::{debug, warn};

/// Levels added on top of the country level.
pub const ENRICHMENT_LEVELS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionEnrichment {
    pub tree: Level,
    /// Distinct countries that had no lookup row, in encounter order.
    pub missing_countries: Vec<String>,
}

pub fn enrich_with_regions(countries: Level, table: &RegionTable) -> RegionEnrichment {
    let mut tree = Level::new();
    let mut seen_missing: BTreeSet<String> = BTreeSet::new();
    let mut missing_countries = Vec::new();

    for (country, node) in countries.into_entries() {
        let Some(entry) = table.lookup(&country) else {
            if seen_missing.insert(country.clone()) {
                warn!(country = %country, "country not in region table, skipping");
                missing_countries.push(country);
            }
            continue;
        };

        let region = tree.get_or_insert_with(&entry.region, HierarchicalNode::branch);
        let Some(subregions) = region.subcolumn_mut() else { continue };
        let subregion = subregions.get_or_insert_with(&entry.subregion, HierarchicalNode::branch);
        if let Some(country_level) = subregion.subcolumn_mut() {
            country_level.insert(country, node);
        }
    }

    debug!(regions = tree.len(), missing = missing_countries.len(), "region enrichment applied");
    RegionEnrichment { tree, missing_countries }
}
