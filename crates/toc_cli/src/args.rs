// crates/toc_cli/src/args.rs
//
// CLI argument surface. Paths must be local (no scheme); the manifest and the
// viewer file must exist. `--out` may not exist yet.

use clap::Parser;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use toc_io::looks_like_url;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "toc",
    disable_help_subcommand = true,
    about = "Build TOC grouped data and render plans from a manifest"
)]
pub struct Args {
    /// TOC manifest JSON.
    #[arg(long)]
    pub manifest: PathBuf,

    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Viewer context JSON; when given, every TOC is also rendered to `<name>.wiki`.
    #[arg(long)]
    pub viewer: Option<PathBuf>,

    /// Load, build and synthesize plans without writing anything.
    #[arg(long)]
    pub validate_only: bool,

    /// Warnings and errors only; no summary on stdout.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    validate(&args)?;
    Ok(args)
}

fn validate(args: &Args) -> Result<(), CliError> {
    ensure_local_path(&args.out)?;
    ensure_local_file(&args.manifest, "--manifest")?;
    if let Some(viewer) = &args.viewer {
        ensure_local_file(viewer, "--viewer")?;
    }
    Ok(())
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if looks_like_url(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

fn ensure_local_file(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    match fs::metadata(p) {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(CliError::NotFound(format!("{label} {}", p.display()))),
    }
}
