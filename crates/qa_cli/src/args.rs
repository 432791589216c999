// crates/qa_cli/src/args.rs
//
// Offline CLI argument surface: one local inspection file in, one output
// directory. Lot overrides are checked with the same parsers the engine uses.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;

use qa_core::{InspectionLevel, SamplingType};
use qa_pipeline::LotOverrides;

/// Parsed CLI arguments.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "qa",
    disable_help_subcommand = true,
    about = "Offline, deterministic AQL evaluation of a garment inspection report"
)]
pub struct Args {
    /// Inspection report JSON path.
    #[arg(long)]
    pub input: PathBuf,

    /// Output directory for evaluation.json (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Override the inspection level (I, II, III).
    #[arg(long, value_parser = parse_level)]
    pub level: Option<String>,

    /// Override the sampling type (normal, tightened, reduced).
    #[arg(long, value_parser = parse_sampling)]
    pub sampling: Option<String>,

    /// Override the lot size (> 0).
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub lot_size: Option<i64>,

    /// Load and validate the input only; no evaluation, no output file.
    #[arg(long)]
    pub validate_only: bool,

    /// Exit with code 1 when the lot is rejected.
    #[arg(long)]
    pub fail_on_reject: bool,

    /// Only warnings and errors on stderr; no summary line.
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    pub fn overrides(&self) -> LotOverrides {
        LotOverrides {
            lot_size: self.lot_size,
            inspection_level: self.level.clone(),
            sampling_type: self.sampling.clone(),
        }
    }
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

fn parse_level(s: &str) -> Result<String, String> {
    s.parse::<InspectionLevel>()
        .map(|l| l.as_str().to_string())
        .map_err(|e| e.to_string())
}

fn parse_sampling(s: &str) -> Result<String, String> {
    s.parse::<SamplingType>()
        .map(|t| t.as_str().to_string())
        .map_err(|e| e.to_string())
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    check_args(Args::parse())
}

/// Path checks and normalization after clap has parsed the flags.
fn check_args(mut args: Args) -> Result<Args, CliError> {
    ensure_local_path(&args.out)?;
    ensure_local_exists(&args.input, "--input")?;

    args.input = normalize_path(&args.input);
    args.out = normalize_path(&args.out);
    Ok(args)
}

/// Prefixes that mark a URL rather than a local path.
const URL_MARKERS: [&str; 3] = ["http:", "https:", "file:"];

/// Refuse anything that looks like a URL; the engine never fetches.
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    let Some(text) = p.to_str() else { return Ok(()) };
    let lower = text.trim().to_ascii_lowercase();
    if lower.contains("://") || URL_MARKERS.iter().any(|m| lower.starts_with(m)) {
        return Err(CliError::NonLocalPath(text.to_string()));
    }
    Ok(())
}

/// Local, existing, regular file.
fn ensure_local_exists(p: &Path, flag: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    match fs::metadata(p) {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(CliError::NotFound(format!("{flag} {}", p.display()))),
    }
}

/// Absolute form of `p`; paths that do not exist yet are joined onto the
/// working directory.
fn normalize_path(p: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(p) {
        return real;
    }
    if p.is_absolute() {
        return p.to_path_buf();
    }
    env::current_dir().map(|cwd| cwd.join(p)).unwrap_or_else(|_| p.to_path_buf())
}
