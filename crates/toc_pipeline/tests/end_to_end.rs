// End-to-end through the facade and the plan interpreter: build once, render
// for several viewers.

use assert_json_diff::assert_json_eq;
use serde_json::json;
use toc_core::{ColumnSpec, CompetitionData, FormatterSpec, ProposalKey, ProposalRecord, RegionTable, SortPolicy, ViewerContext};
use toc_pipeline::{PipelineError, Toc};
use toc_report::render;

const NAME: &str = "Climate 2021";

fn key(s: &str) -> ProposalKey {
    s.parse().unwrap()
}

fn proposal(k: &str, cells: &[(&str, &str)]) -> ProposalRecord {
    cells.iter().fold(ProposalRecord::new(key(k)), |p, (c, v)| p.with_cell(*c, *v))
}

fn competition() -> CompetitionData {
    let mut proposals = vec![
        proposal("P1", &[("Country", "Wakanda"), ("State", "North"), ("Topic", "Water\nHealth"), ("Project Title", "Wells")]),
        proposal("P2", &[("Country", "Genovia"), ("State", "East"), ("Topic", "Health"), ("Project Title", "Clinic")]),
        proposal("P3", &[("Country", "Wakanda"), ("State", "South"), ("Topic", "Water"), ("Project Title", "Pumps")]),
    ];
    for i in 0..50 {
        proposals.push(proposal(&format!("N{i}"), &[("Country", "Narnia"), ("State", "Lantern Waste"), ("Topic", "Magic")]));
    }
    CompetitionData { name: NAME.into(), proposals }
}

fn viewer(ids: &[&str]) -> ViewerContext {
    let all = competition();
    ids.iter().fold(ViewerContext::default(), |v, k| {
        let p = all.proposals.iter().find(|p| p.key.as_str() == *k).unwrap();
        v.grant(NAME, key(k), p.cells.clone())
    })
}

fn regions() -> RegionTable {
    [("Wakanda", "SubR1", "RegionX"), ("Genovia", "Western Europe", "Europe")].into_iter().collect()
}

#[test]
fn region_aware_toc_drops_unknown_countries_and_nests_known_ones() {
    let mut toc = Toc::region_aware("Where", vec![vec!["Country".into(), "State".into()]], regions()).unwrap();
    toc.build(&competition()).unwrap();

    // fifty Narnia proposals, one report
    assert_eq!(toc.missing_countries(), ["Narnia".to_string()]);

    let data = serde_json::to_value(toc.grouped_data().unwrap()).unwrap();
    assert_json_eq!(
        data,
        json!({
            "groups": {
                "Europe": { "shown": false, "subcolumn": {
                    "Western Europe": { "shown": false, "subcolumn": {
                        "Genovia": { "shown": false, "subcolumn": {
                            "East": { "shown": false, "proposals": ["P2"] } } } } } } },
                "RegionX": { "shown": false, "subcolumn": {
                    "SubR1": { "shown": false, "subcolumn": {
                        "Wakanda": { "shown": false, "subcolumn": {
                            "North": { "shown": false, "proposals": ["P1"] },
                            "South": { "shown": false, "proposals": ["P3"] } } } } } } }
            }
        })
    );

    let spec = toc.render_spec().unwrap();
    let out = render(&spec, toc.grouped_data().unwrap(), &viewer(&["P1", "P3"])).unwrap();
    assert_eq!(
        out,
        "__TOC__\n= RegionX =\n== SubR1 ==\n=== Wakanda ===\n==== North ====\n* P1\n==== South ====\n* P3\n"
    );
}

#[test]
fn by_count_orders_on_filtered_counts() {
    let mut toc = Toc::multi_line("Topic", ["Topic"]).unwrap().with_sort(SortPolicy::ByCount).with_wiki_toc(false);
    toc.build(&competition()).unwrap();
    let spec = toc.render_spec().unwrap();
    let data = toc.grouped_data().unwrap();

    // Magic has 50 members at build time but none visible here
    let out = render(&spec, data, &viewer(&["P1", "P2", "P3"])).unwrap();
    let headings: Vec<&str> = out.lines().filter(|l| l.starts_with("= ")).collect();
    assert_eq!(headings, vec!["= Water (2) =", "= Health (2) ="]);

    let out = render(&spec, data, &viewer(&["P2"])).unwrap();
    let headings: Vec<&str> = out.lines().filter(|l| l.starts_with("= ")).collect();
    assert_eq!(headings, vec!["= Health (1) ="]);
}

#[test]
fn one_artifact_renders_independently_per_viewer() {
    let mut toc = Toc::generic("Where", ["Country"]).unwrap();
    toc.build(&competition()).unwrap();
    let spec = toc.render_spec().unwrap();
    let data = toc.grouped_data().unwrap().clone();

    let a1 = render(&spec, &data, &viewer(&["P1", "P2"])).unwrap();
    let b = render(&spec, &data, &viewer(&["P3"])).unwrap();
    let a2 = render(&spec, &data, &viewer(&["P1", "P2"])).unwrap();
    assert_eq!(a1, a2);
    assert!(b.contains("= Wakanda (1) =") && !b.contains("Genovia"));
    // built data never carries render state
    assert_eq!(&data, toc.grouped_data().unwrap());
}

#[test]
fn table_formatter_from_manifest_spec() {
    let spec = FormatterSpec::WikiTable {
        title_column: None,
        columns: vec![
            ColumnSpec::direct("Title", "Project Title"),
            ColumnSpec::template("Where", "{{ row.Country }} / {{ row.State }}"),
        ],
    };
    let mut toc = Toc::geographic("Where", vec![vec!["Country".into()]]).unwrap().with_formatter_spec(spec);
    toc.build(&competition()).unwrap();
    let out = render(&toc.render_spec().unwrap(), toc.grouped_data().unwrap(), &viewer(&["P1", "P3"])).unwrap();

    assert!(out.starts_with("__TOC__\n= Wakanda =\n{| class=\"wikitable"));
    assert!(out.contains("| style='vertical-align:top;' |Wells\n"));
    assert!(out.contains("| style='vertical-align:top;' |Wakanda / South\n"));
    assert_eq!(out.matches("|}\n").count(), 1);
}

#[test]
fn list_toc_with_restriction() {
    let mut toc = Toc::list("Shortlist").unwrap().restrict_to([key("P3"), key("P1"), key("Gone")]);
    toc.build(&competition()).unwrap();
    let out = render(&toc.render_spec().unwrap(), toc.grouped_data().unwrap(), &viewer(&["P1", "P2", "P3"])).unwrap();
    assert_eq!(out, "* P1\n* P3\n");
}

#[test]
fn viewer_without_the_competition_set_is_a_render_error() {
    let mut toc = Toc::list("All").unwrap();
    toc.build(&competition()).unwrap();
    let err = render(&toc.render_spec().unwrap(), toc.grouped_data().unwrap(), &ViewerContext::default()).unwrap_err();
    assert_eq!(err.to_string(), format!("no accessible proposal set named '{NAME}'"));
}

#[test]
fn second_build_is_refused() {
    let mut toc = Toc::list("All").unwrap();
    toc.build(&competition()).unwrap();
    assert!(matches!(toc.build(&competition()), Err(PipelineError::AlreadyBuilt(_))));
}
