// crates/toc_pipeline/src/toc.rs
//
// The TOC facade. Lifecycle:
//   construct (name, grouping columns, presentation)   static configuration
//   build(competition)                                exactly once
//   grouped_data() / render_spec()                    any number of times
//
// The accessible-set name in the plan is the competition name, which is only
// known at build; asking for a plan before that is an error.

use std::collections::BTreeSet;

use toc_algo::{enrich_with_regions, CellMode, FlatGroupingEngine, HierarchicalGroupingEngine, ENRICHMENT_LEVELS};
use toc_core::{Competition, FormatterSpec, GroupedData, Proposal, ProposalKey, RegionTable, SortPolicy, TocName};
use toc_report::{synthesize, ProposalFormatter, RenderSpecification, TocShape};
use tracing::{info, warn};

use crate::budget::{ANNUAL_BUDGET_BRACKETS, ANNUAL_BUDGET_TOC_NAME};
use crate::PipelineError;

pub use toc_io::manifest::TocKind;

#[derive(Clone, Debug)]
enum Grouping {
    Flat { engine: FlatGroupingEngine, declared: Vec<String>, sort: Option<SortPolicy>, include_wiki_toc: bool },
    Hierarchical { engine: HierarchicalGroupingEngine, regions: Option<RegionTable> },
    List,
}

/// Raw formatter specs are kept as given and checked when the plan is
/// synthesized, so a bad column definition surfaces from `render_spec`.
#[derive(Clone, Debug)]
enum Presentation {
    Ready(ProposalFormatter),
    Spec(FormatterSpec),
}

#[derive(Clone, Debug)]
struct Built {
    data: GroupedData,
    access_var: String,
    /// Final tree depth, enrichment included.
    depth: usize,
    missing_countries: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Toc {
    name: TocName,
    kind: TocKind,
    grouping: Grouping,
    presentation: Presentation,
    restriction: Option<Vec<ProposalKey>>,
    built: Option<Built>,
}

fn toc_name(name: &str) -> Result<TocName, PipelineError> {
    TocName::try_from(name).map_err(|_| PipelineError::InvalidName(name.to_string()))
}

impl Toc {
    fn new(name: TocName, kind: TocKind, grouping: Grouping) -> Self {
        Self {
            name,
            kind,
            grouping,
            presentation: Presentation::Ready(ProposalFormatter::default()),
            restriction: None,
            built: None,
        }
    }

    fn flat<I, S>(name: &str, kind: TocKind, columns: I, mode: CellMode) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = FlatGroupingEngine::new(columns, mode);
        if engine.columns().is_empty() {
            return Err(PipelineError::Definition { toc: name.to_string(), problem: "no grouping column".into() });
        }
        let grouping = Grouping::Flat { engine, declared: Vec::new(), sort: None, include_wiki_toc: true };
        Ok(Self::new(toc_name(name)?, kind, grouping))
    }

    // ----- constructors -----

    /// One group per distinct cell value of `columns`.
    pub fn generic<I, S>(name: &str, columns: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::flat(name, TocKind::Generic, columns, CellMode::Single)
    }

    /// Like `generic`, but every line of a cell is its own group.
    pub fn multi_line<I, S>(name: &str, columns: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::flat(name, TocKind::MultiLine, columns, CellMode::MultiLine)
    }

    /// Every accessible proposal, once, in competition order.
    pub fn list(name: &str) -> Result<Self, PipelineError> {
        Ok(Self::new(toc_name(name)?, TocKind::List, Grouping::List))
    }

    /// Fixed-name TOC over the nine budget brackets, in bracket order.
    pub fn annual_budget(column: &str) -> Result<Self, PipelineError> {
        Self::flat(ANNUAL_BUDGET_TOC_NAME, TocKind::AnnualBudget, [column], CellMode::Single)?
            .with_groups(ANNUAL_BUDGET_BRACKETS)
            .map(|t| t.with_sort(SortPolicy::None))
    }

    pub fn geographic(name: &str, column_sets: Vec<Vec<String>>) -> Result<Self, PipelineError> {
        let engine = HierarchicalGroupingEngine::new(column_sets)?;
        Ok(Self::new(toc_name(name)?, TocKind::Geographic, Grouping::Hierarchical { engine, regions: None }))
    }

    /// Geographic TOC whose top level (countries) is nested under region and
    /// subregion from `regions`.
    pub fn region_aware(name: &str, column_sets: Vec<Vec<String>>, regions: RegionTable) -> Result<Self, PipelineError> {
        let engine = HierarchicalGroupingEngine::new(column_sets)?;
        Ok(Self::new(
            toc_name(name)?,
            TocKind::RegionAwareGeographic,
            Grouping::Hierarchical { engine, regions: Some(regions) },
        ))
    }

    // ----- configuration (before build) -----

    /// Declared groups for flat TOCs: listed first, in this order, even when empty.
    pub fn with_groups<I, S>(mut self, groups: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match &mut self.grouping {
            Grouping::Flat { declared, .. } => {
                *declared = groups.into_iter().map(Into::into).collect();
                Ok(self)
            }
            _ => Err(self.definition_error("declared groups only apply to flat tocs")),
        }
    }

    /// Explicit group order; flat TOCs only, ignored elsewhere.
    pub fn with_sort(mut self, policy: SortPolicy) -> Self {
        if let Grouping::Flat { sort, .. } = &mut self.grouping {
            *sort = Some(policy);
        }
        self
    }

    pub fn with_wiki_toc(mut self, include: bool) -> Self {
        if let Grouping::Flat { include_wiki_toc, .. } = &mut self.grouping {
            *include_wiki_toc = include;
        }
        self
    }

    pub fn with_formatter(mut self, formatter: ProposalFormatter) -> Self {
        self.presentation = Presentation::Ready(formatter);
        self
    }

    pub fn with_formatter_spec(mut self, spec: FormatterSpec) -> Self {
        self.presentation = Presentation::Spec(spec);
        self
    }

    /// Use only these proposals instead of every proposal of the competition.
    /// Competition order is kept.
    pub fn restrict_to<I: IntoIterator<Item = ProposalKey>>(mut self, keys: I) -> Self {
        self.restriction = Some(keys.into_iter().collect());
        self
    }

    // ----- accessors -----

    pub fn name(&self) -> &TocName {
        &self.name
    }

    pub fn kind(&self) -> TocKind {
        self.kind
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Countries dropped by region enrichment, in encounter order.
    pub fn missing_countries(&self) -> &[String] {
        match &self.built {
            Some(b) => &b.missing_countries,
            None => &[],
        }
    }

    fn definition_error(&self, problem: &str) -> PipelineError {
        PipelineError::Definition { toc: self.name.to_string(), problem: problem.to_string() }
    }

    fn built(&self) -> Result<&Built, PipelineError> {
        self.built.as_ref().ok_or_else(|| PipelineError::NotBuilt(self.name.to_string()))
    }

    // ----- build -----

    pub fn build<C: Competition>(&mut self, competition: &C) -> Result<(), PipelineError> {
        if self.built.is_some() {
            return Err(PipelineError::AlreadyBuilt(self.name.to_string()));
        }

        let mut proposals = competition.ordered_proposals();
        if let Some(keys) = &self.restriction {
            let wanted: BTreeSet<&ProposalKey> = keys.iter().collect();
            proposals.retain(|p| wanted.contains(p.key()));
            let present: BTreeSet<&ProposalKey> = proposals.iter().map(|p| p.key()).collect();
            for key in wanted.difference(&present) {
                warn!(toc = %self.name, key = %key, "restricted proposal not in competition");
            }
        }

        let mut missing_countries = Vec::new();
        let (data, depth) = match &self.grouping {
            Grouping::Flat { engine, declared, .. } => {
                let table = engine.build(proposals.iter().copied(), declared)?;
                (GroupedData::Flat { groups: table.into_groups() }, 1)
            }
            Grouping::Hierarchical { engine, regions } => {
                let tree = engine.build(proposals.iter().copied());
                match regions {
                    Some(table) => {
                        let enriched = enrich_with_regions(tree, table);
                        missing_countries = enriched.missing_countries;
                        (GroupedData::Tree { groups: enriched.tree }, engine.depth() + ENRICHMENT_LEVELS)
                    }
                    None => (GroupedData::Tree { groups: tree }, engine.depth()),
                }
            }
            Grouping::List => {
                let ids = proposals.iter().map(|p| p.key().clone()).collect();
                (GroupedData::List { proposal_ids: ids }, 1)
            }
        };

        info!(
            toc = %self.name,
            kind = ?self.kind,
            competition = competition.name(),
            proposals = proposals.len(),
            depth,
            "toc built"
        );
        self.built = Some(Built { data, access_var: competition.name().to_string(), depth, missing_countries });
        Ok(())
    }

    // ----- outputs -----

    pub fn grouped_data(&self) -> Result<&GroupedData, PipelineError> {
        Ok(&self.built()?.data)
    }

    pub fn shape(&self) -> Result<TocShape, PipelineError> {
        let built = self.built()?;
        Ok(match &self.grouping {
            Grouping::Flat { include_wiki_toc, .. } => TocShape::Flat { include_wiki_toc: *include_wiki_toc },
            Grouping::Hierarchical { .. } => TocShape::Hierarchical { depth: built.depth },
            Grouping::List => TocShape::List,
        })
    }

    /// Effective group order for flat TOCs.
    pub fn sort_policy(&self) -> SortPolicy {
        match &self.grouping {
            Grouping::Flat { declared, sort, .. } => SortPolicy::resolve(*sort, !declared.is_empty()),
            _ => SortPolicy::None,
        }
    }

    pub fn render_spec(&self) -> Result<RenderSpecification, PipelineError> {
        let built = self.built()?;
        let formatter = match &self.presentation {
            Presentation::Ready(f) => f.clone(),
            Presentation::Spec(spec) => ProposalFormatter::try_from(spec)?,
        };
        Ok(synthesize(self.shape()?, &formatter, self.sort_policy(), &built.access_var)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toc_core::{ColumnSpec, CompetitionData, ProposalRecord};
    use toc_report::ReportError;

    fn competition() -> CompetitionData {
        let p = |k: &str, topic: &str, budget: &str| {
            ProposalRecord::new(k.parse().unwrap()).with_cell("Topic", topic).with_cell("Annual Budget", budget)
        };
        CompetitionData {
            name: "Climate 2021".into(),
            proposals: vec![
                p("P1", "Water", "$1 to $5 Million"),
                p("P2", "Health", "Less than $1 Million"),
                p("P3", "Water", ""),
            ],
        }
    }

    #[test]
    fn build_runs_once_and_outputs_need_it() {
        let mut toc = Toc::generic("Topic", ["Topic"]).unwrap();
        assert!(matches!(toc.grouped_data(), Err(PipelineError::NotBuilt(_))));
        assert!(matches!(toc.render_spec(), Err(PipelineError::NotBuilt(_))));

        toc.build(&competition()).unwrap();
        assert!(matches!(toc.build(&competition()), Err(PipelineError::AlreadyBuilt(_))));
        assert_eq!(toc.render_spec().unwrap().access_var, "Climate 2021");
    }

    #[test]
    fn default_sort_depends_on_declared_groups() {
        let plain = Toc::generic("Topic", ["Topic"]).unwrap();
        assert_eq!(plain.sort_policy(), SortPolicy::ByName);
        let declared = Toc::generic("Topic", ["Topic"]).unwrap().with_groups(["Water"]).unwrap();
        assert_eq!(declared.sort_policy(), SortPolicy::None);
        let explicit = declared.with_sort(SortPolicy::ByCount);
        assert_eq!(explicit.sort_policy(), SortPolicy::ByCount);
    }

    #[test]
    fn annual_budget_declares_brackets_in_order() {
        let mut toc = Toc::annual_budget("Annual Budget").unwrap();
        assert_eq!(toc.name().as_str(), "Annual_Budgets");
        toc.build(&competition()).unwrap();
        let GroupedData::Flat { groups } = toc.grouped_data().unwrap() else { panic!("flat expected") };
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ANNUAL_BUDGET_BRACKETS.to_vec());
        assert_eq!(toc.sort_policy(), SortPolicy::None);
    }

    #[test]
    fn restriction_keeps_competition_order() {
        let mut toc = Toc::list("All").unwrap().restrict_to(["P3".parse().unwrap(), "P1".parse().unwrap()]);
        toc.build(&competition()).unwrap();
        assert_eq!(
            toc.grouped_data().unwrap(),
            &GroupedData::List { proposal_ids: vec!["P1".parse().unwrap(), "P3".parse().unwrap()] }
        );
    }

    #[test]
    fn bad_column_definition_surfaces_from_render_spec() {
        let spec = FormatterSpec::WikiTable {
            title_column: None,
            columns: vec![ColumnSpec { heading: "Broken".into(), ..Default::default() }],
        };
        let mut toc = Toc::generic("Topic", ["Topic"]).unwrap().with_formatter_spec(spec);
        toc.build(&competition()).unwrap();
        assert!(matches!(
            toc.render_spec(),
            Err(PipelineError::Report(ReportError::ColumnDefinition { .. }))
        ));
    }

    #[test]
    fn constructor_checks() {
        assert!(matches!(Toc::list("../x"), Err(PipelineError::InvalidName(_))));
        assert!(matches!(Toc::generic("Topic", Vec::<String>::new()), Err(PipelineError::Definition { .. })));
        assert!(matches!(Toc::geographic("Where", vec![]), Err(PipelineError::Algo(_))));
        assert!(Toc::list("All").unwrap().with_groups(["A"]).is_err());
    }

    #[test]
    fn region_aware_depth_includes_enrichment() {
        let regions: RegionTable = [("Wakanda", "SubR1", "RegionX")].into_iter().collect();
        let mut toc = Toc::region_aware("Where", vec![vec!["Country".into()]], regions).unwrap();
        let c = CompetitionData {
            name: "C".into(),
            proposals: vec![
                ProposalRecord::new("P1".parse().unwrap()).with_cell("Country", "Wakanda"),
                ProposalRecord::new("P2".parse().unwrap()).with_cell("Country", "Narnia"),
            ],
        };
        toc.build(&c).unwrap();
        assert_eq!(toc.shape().unwrap(), TocShape::Hierarchical { depth: 3 });
        assert_eq!(toc.missing_countries(), ["Narnia".to_string()]);
    }
}
