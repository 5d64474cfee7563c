//! Annual budget brackets. Budgets are normalised into these labels upstream,
//! so every competition's budget TOC shares one name and one group order.

pub use toc_io::manifest::ANNUAL_BUDGET_TOC_NAME;

/// Declared groups of the annual budget TOC, ascending.
pub const ANNUAL_BUDGET_BRACKETS: [&str; 9] = [
    "Less than $1 Million",
    "$1 to $5 Million",
    "$5 to $10 Million",
    "$10 to $25 Million",
    "$25 to $50 Million",
    "$50 to $100 Million",
    "$100 to $500 Million",
    "$500 Million to $1 Billion",
    "More than $1 Billion",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn brackets_are_distinct() {
        let set: BTreeSet<&str> = ANNUAL_BUDGET_BRACKETS.iter().copied().collect();
        assert_eq!(set.len(), ANNUAL_BUDGET_BRACKETS.len());
    }
}
