// crates/toc_cli/src/main.rs
//
// manifest → build every TOC once → <name>.json + <name>.plan.json
// (+ <name>.wiki per TOC when --viewer is given).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Manifest, input shape, TOC definition or plan synthesis problems.
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    pub const RENDER: i32 = 5;
}

use std::process::ExitCode;

use toc_io::IoError;
use toc_pipeline::{run_from_manifest_path, PipelineError, RunOptions, RunSummary};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate, Args};

fn main() -> ExitCode {
    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("toc: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(summary) => {
            if !args.quiet {
                print_summary(&args, &summary);
            }
            exitcodes::OK
        }
        Err(e) => {
            eprintln!("toc: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise `info`, or `warn` with `--quiet`.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn run(args: &Args) -> Result<RunSummary, PipelineError> {
    debug!(manifest = %args.manifest.display(), out = %args.out.display(), "run");
    let opts = RunOptions { out_dir: args.out.clone(), viewer: args.viewer.clone(), validate_only: args.validate_only };
    run_from_manifest_path(&args.manifest, &opts)
}

fn map_error(e: &PipelineError) -> i32 {
    use exitcodes::*;
    match e {
        PipelineError::Io(IoError::Path(_)) => IO,
        PipelineError::Io(IoError::Json { .. } | IoError::Csv(_) | IoError::Manifest(_) | IoError::Invalid(_)) => {
            VALIDATION
        }
        PipelineError::InvalidName(_)
        | PipelineError::Definition { .. }
        | PipelineError::AlreadyBuilt(_)
        | PipelineError::NotBuilt(_)
        | PipelineError::Algo(_)
        | PipelineError::Report(_) => VALIDATION,
        PipelineError::Render { .. } => RENDER,
    }
}

fn print_summary(args: &Args, summary: &RunSummary) {
    let verb = if args.validate_only { "validated" } else { "built" };
    println!("{}: {verb} {} toc(s)", summary.competition, summary.tocs.len());
    for toc in &summary.tocs {
        let mut line = format!("  {}", toc.name);
        if let Some(paths) = &toc.artifacts {
            line.push_str(&format!(" -> {}", paths.grouped_data.display()));
        }
        if toc.rendered {
            line.push_str(" (rendered)");
        }
        if !toc.missing_countries.is_empty() {
            line.push_str(&format!(" [no region for: {}]", toc.missing_countries.join(", ")));
        }
        println!("{line}");
    }
}
