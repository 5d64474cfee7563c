// Manifest-driven runs against files in a temp dir.

use std::fs;
use std::path::Path;

use assert_json_diff::assert_json_include;
use serde_json::{json, Value};
use toc_pipeline::{run_from_manifest_path, PipelineError, RunOptions};

fn write_inputs(dir: &Path, tocs: Value) -> std::path::PathBuf {
    fs::write(
        dir.join("proposals.json"),
        json!({
            "name": "Climate 2021",
            "proposals": [
                { "key": "P1", "cells": { "Country": "Wakanda", "Topic": "Water", "Annual Budget": "$1 to $5 Million" } },
                { "key": "P2", "cells": { "Country": "Narnia", "Topic": "Health", "Annual Budget": "More than $1 Billion" } }
            ]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(dir.join("regionconfig.csv"), "country,subregion,region\nWakanda,SubR1,RegionX\n").unwrap();
    fs::write(
        dir.join("viewer.json"),
        json!({ "proposal_sets": { "Climate 2021": { "P1": { "Topic": "Water" } } } }).to_string(),
    )
    .unwrap();

    let manifest = dir.join("toc.json");
    fs::write(
        &manifest,
        json!({ "competition": "proposals.json", "region_table": "regionconfig.csv", "tocs": tocs }).to_string(),
    )
    .unwrap();
    manifest
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn writes_grouped_data_plan_and_rendered_text() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_inputs(
        dir.path(),
        json!([
            { "kind": "generic", "name": "Topic", "column": "Topic", "sort": "count" },
            { "kind": "annual_budget", "column": "Annual Budget" },
            { "kind": "region_aware_geographic", "name": "Where", "column_sets": [["Country"]] }
        ]),
    );
    let out = dir.path().join("out");
    let opts = RunOptions { out_dir: out.clone(), viewer: Some(dir.path().join("viewer.json")), validate_only: false };

    let summary = run_from_manifest_path(&manifest, &opts).unwrap();
    assert_eq!(summary.competition, "Climate 2021");
    assert_eq!(summary.tocs.len(), 3);
    assert!(summary.tocs.iter().all(|t| t.rendered));
    assert_eq!(summary.tocs[2].missing_countries, vec!["Narnia".to_string()]);

    assert_json_include!(
        actual: read_json(&out.join("Topic.json")),
        expected: json!({ "groups": [ { "name": "Water", "all_proposal_ids": ["P1"] } ] })
    );
    assert_json_include!(
        actual: read_json(&out.join("Topic.plan.json")),
        expected: json!({ "shape": { "kind": "flat", "include_wiki_toc": true }, "data_var": "groups", "access_var": "Climate 2021" })
    );
    assert!(out.join("Annual_Budgets.json").is_file());

    assert_eq!(fs::read_to_string(out.join("Topic.wiki")).unwrap(), "__TOC__\n<div id='Water'></div>\n= Water (1) =\n* P1\n");
    assert_eq!(
        fs::read_to_string(out.join("Where.wiki")).unwrap(),
        "__TOC__\n= RegionX =\n== SubR1 ==\n=== Wakanda ===\n* P1\n"
    );
}

#[test]
fn validate_only_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_inputs(dir.path(), json!([{ "kind": "list", "name": "All" }]));
    let out = dir.path().join("out");
    let opts = RunOptions { out_dir: out.clone(), viewer: None, validate_only: true };

    let summary = run_from_manifest_path(&manifest, &opts).unwrap();
    assert!(summary.tocs[0].artifacts.is_none());
    assert!(!out.exists());
}

#[test]
fn bad_column_definition_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_inputs(
        dir.path(),
        json!([{ "kind": "list", "name": "All",
                 "formatter": { "type": "wiki_table", "columns": [ { "heading": "Oops", "name": "A", "template": "B" } ] } }]),
    );
    let opts = RunOptions { out_dir: dir.path().join("out"), viewer: None, validate_only: true };
    let err = run_from_manifest_path(&manifest, &opts).unwrap_err();
    assert!(matches!(err, PipelineError::Report(_)), "{err}");
}
