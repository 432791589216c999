// crates/qa_cli/src/main.rs
//
// Exit codes, typed error mapping, logging init, the validate-only
// short-circuit and the full run (load → pipeline → evaluation.json).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Only with --fail-on-reject.
    pub const REJECTED: i32 = 1;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, CliError};

use qa_core::Status;
use qa_io::{canonical_json, loader, IoError};
use qa_pipeline::{run_with_ctx, validate_ctx, PipelineCtx, PipelineError, Severity};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Schema / JSON shape / lot configuration / validation report failures
    Validation(String),
    /// Read / write / path errors
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("qa: error: {e}");
            let rc = match e {
                CliError::NotFound(_) => exitcodes::IO,
                CliError::NonLocalPath(_) => exitcodes::VALIDATION,
            };
            return ExitCode::from(rc as u8);
        }
    };

    init_logging(args.quiet);

    let rc = if args.validate_only {
        match validate_only(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report(&e),
        }
    } else {
        match run_once(&args) {
            Ok(Status::Fail) if args.fail_on_reject => exitcodes::REJECTED,
            Ok(_) => exitcodes::OK,
            Err(e) => report(&e),
        }
    };

    ExitCode::from(rc as u8)
}

/// stderr subscriber; `RUST_LOG` wins unless `--quiet`.
fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report(e: &MainError) -> i32 {
    eprintln!("qa: error: {e}");
    map_error(e)
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Schema(m) => MainError::Validation(format!("schema: {m}")),
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
        IoError::Invalid(m) => MainError::Io(m),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Schema(m) => MainError::Validation(m),
        PipelineError::Config(c) => MainError::Validation(c.to_string()),
        PipelineError::Validate(r) => MainError::Validation(r.summary()),
        PipelineError::Io(m) | PipelineError::Build(m) => MainError::Io(m),
    }
}

/// Load + schema + semantic validation; prints every issue, writes nothing.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let loaded = loader::load_input(&args.input).map_err(map_io_err)?;
    let ctx = PipelineCtx { overrides: args.overrides(), ..PipelineCtx::new(loaded) };
    let r = validate_ctx(&ctx);

    for issue in &r.issues {
        let sev = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("{sev}: {issue}");
    }
    if !r.pass {
        return Err(MainError::Validation(r.summary()));
    }
    if !args.quiet {
        println!("validate-only: input OK ({} warning(s))", r.warnings().count());
    }
    Ok(())
}

fn run_once(args: &Args) -> Result<Status, MainError> {
    let loaded = loader::load_input(&args.input).map_err(map_io_err)?;
    let ctx = PipelineCtx { overrides: args.overrides(), ..PipelineCtx::new(loaded) };
    let outs = run_with_ctx(&ctx).map_err(map_pipeline_err)?;
    let doc = &outs.evaluation;

    let path = write_evaluation(args, doc)?;
    info!(path = %path.display(), "evaluation written");

    let body = &doc.body;
    if !args.quiet {
        println!(
            "{} {} lot={} letter={} sample={} minor={} major={} critical={} -> {}",
            body.verdict.overall,
            doc.id,
            body.lot.lot_size,
            body.lot.code_letter,
            body.lot.sample_size,
            body.tally.minor,
            body.tally.major,
            body.tally.critical,
            path.display()
        );
    }
    Ok(body.verdict.overall)
}

fn write_evaluation(args: &Args, doc: &qa_pipeline::EvaluationDoc) -> Result<PathBuf, MainError> {
    fs::create_dir_all(&args.out)
        .map_err(|e| MainError::Io(format!("mkdir {}: {e}", args.out.display())))?;

    let path = args.out.join("evaluation.json");
    let value = serde_json::to_value(doc).map_err(|e| MainError::Io(format!("serialize evaluation: {e}")))?;
    canonical_json::write_canonical_file(&path, &value)
        .map_err(|e| MainError::Io(format!("write evaluation.json: {e}")))?;
    Ok(path)
}
