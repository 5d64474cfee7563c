// crates/toc_pipeline/src/run.rs
//
// Whole-manifest flow:
//   LOAD      manifest → competition (+ region table)
//   BUILD     one Toc per definition, built once, plan synthesized
//   ARTIFACTS <name>.json + <name>.plan.json per TOC (skipped when validating)
//   RENDER    optional: <name>.wiki per TOC for one viewer context

use std::path::{Path, PathBuf};

use toc_core::{GroupedData, TocName, ViewerContext};
use toc_io::artifacts::{write_json_atomic, write_text_atomic, ArtifactPaths};
use toc_io::loader::{load_competition, load_region_table, load_viewer};
use toc_io::manifest::load_manifest;
use toc_report::{render, RenderSpecification};
use tracing::info;

use crate::definition::toc_from_definition;
use crate::PipelineError;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub out_dir: PathBuf,
    /// Render every TOC for this viewer context after writing the artifacts.
    pub viewer: Option<PathBuf>,
    /// Load, build and synthesize only; write nothing.
    pub validate_only: bool,
}

#[derive(Debug, Clone)]
pub struct TocSummary {
    pub name: TocName,
    pub artifacts: Option<ArtifactPaths>,
    pub rendered: bool,
    pub missing_countries: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub competition: String,
    pub tocs: Vec<TocSummary>,
}

/// Output of the BUILD stage for one TOC.
#[derive(Debug, Clone)]
pub struct BuiltToc {
    pub name: TocName,
    pub grouped_data: GroupedData,
    pub plan: RenderSpecification,
    pub missing_countries: Vec<String>,
}

/// LOAD + BUILD for every TOC in the manifest.
pub fn build_from_manifest(manifest_path: &Path) -> Result<(String, Vec<BuiltToc>), PipelineError> {
    let manifest = load_manifest(manifest_path)?;
    let competition = load_competition(&manifest.competition)?;
    let regions = manifest.region_table.as_deref().map(load_region_table).transpose()?;

    let mut built = Vec::with_capacity(manifest.tocs.len());
    for def in &manifest.tocs {
        let mut toc = toc_from_definition(def, regions.as_ref())?;
        toc.build(&competition)?;
        built.push(BuiltToc {
            name: toc.name().clone(),
            grouped_data: toc.grouped_data()?.clone(),
            plan: toc.render_spec()?,
            missing_countries: toc.missing_countries().to_vec(),
        });
    }
    Ok((competition.name, built))
}

/// Render one built TOC for `viewer`.
pub fn render_built(toc: &BuiltToc, viewer: &ViewerContext) -> Result<String, PipelineError> {
    render(&toc.plan, &toc.grouped_data, viewer)
        .map_err(|source| PipelineError::Render { toc: toc.name.to_string(), source })
}

pub fn run_from_manifest_path(manifest_path: &Path, opts: &RunOptions) -> Result<RunSummary, PipelineError> {
    let (competition, built) = build_from_manifest(manifest_path)?;

    let viewer = match (&opts.viewer, opts.validate_only) {
        (Some(path), false) => Some(load_viewer(path)?),
        _ => None,
    };

    let mut summary = RunSummary { competition, tocs: Vec::with_capacity(built.len()) };
    for toc in built {
        let mut artifacts = None;
        let mut rendered = false;
        if !opts.validate_only {
            let paths = ArtifactPaths::new(&opts.out_dir, &toc.name);
            write_json_atomic(&paths.grouped_data, &toc.grouped_data)?;
            write_json_atomic(&paths.plan, &toc.plan)?;
            if let Some(v) = &viewer {
                write_text_atomic(&paths.rendered, &render_built(&toc, v)?)?;
                rendered = true;
            }
            artifacts = Some(paths);
        }
        info!(toc = %toc.name, written = artifacts.is_some(), rendered, "toc done");
        summary.tocs.push(TocSummary { name: toc.name, artifacts, rendered, missing_countries: toc.missing_countries });
    }
    Ok(summary)
}
