//! qa_pipeline: deterministic evaluation surface
//! (load → validate → classify → tally → resolve → decide → summarize → build).
//!
//! This crate stays free of terminal and file output: JSON, schema and
//! hashing go through `qa_io`, the math through `qa_algo`. Writing the
//! document is the caller's job.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use qa_core::ConfigError;
use qa_io::hasher;
use qa_io::loader::{self, InspectionInput, LoadedInput, RawLot};
use qa_io::IoError;

pub mod build_result;
pub mod evaluate;
pub mod validate;

pub use build_result::{build_evaluation_doc, verify_id, EvaluationDoc, ResultInputs};
pub use evaluate::{evaluate, Evaluation};
pub use validate::{validate, EntityRef, Severity, ValidationIssue, ValidationReport};

/// Engine identifiers echoed into every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

/// Engine identifiers; `QA_ENGINE_BUILD` may be baked in at compile time.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        vendor: "qa".to_string(),
        name: "qa_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: option_env!("QA_ENGINE_BUILD").unwrap_or("dev").to_string(),
    }
}

/// Lot fields that replace the ones read from the input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotOverrides {
    pub lot_size: Option<i64>,
    pub inspection_level: Option<String>,
    pub sampling_type: Option<String>,
}

impl LotOverrides {
    pub fn is_empty(&self) -> bool {
        self.lot_size.is_none() && self.inspection_level.is_none() && self.sampling_type.is_none()
    }

    pub fn apply(&self, lot: &mut RawLot) {
        if let Some(n) = self.lot_size {
            lot.lot_size = n;
        }
        if let Some(level) = &self.inspection_level {
            lot.inspection_level = level.clone();
        }
        if let Some(sampling) = &self.sampling_type {
            lot.sampling_type = sampling.clone();
        }
    }
}

/// Pipeline context: the input is already loaded and schema-checked by `qa_io`.
#[derive(Debug, Clone)]
pub struct PipelineCtx {
    pub loaded: LoadedInput,
    pub engine_meta: EngineMeta,
    pub overrides: LotOverrides,
}

impl PipelineCtx {
    pub fn new(loaded: LoadedInput) -> Self {
        Self { loaded, engine_meta: engine_identifiers(), overrides: LotOverrides::default() }
    }

    /// The input with lot overrides applied.
    pub fn effective_input(&self) -> InspectionInput {
        let mut input = self.loaded.input.clone();
        self.overrides.apply(&mut input.lot);
        input
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub evaluation: EvaluationDoc,
    pub report: ValidationReport,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(String),
    #[error("schema: {0}")]
    Schema(String),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("validation failed: {}", .0.summary())]
    Validate(ValidationReport),
    #[error("build: {0}")]
    Build(String),
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Path(m) => PipelineError::Io(format!("path: {m}")),
            IoError::Invalid(m) => PipelineError::Io(m),
            IoError::Json { pointer, msg } => PipelineError::Schema(format!("json {pointer}: {msg}")),
            IoError::Schema(m) => PipelineError::Schema(m),
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                 Public API                                 */
/* -------------------------------------------------------------------------- */

/// Validate only; no evaluation is attempted.
pub fn validate_ctx(ctx: &PipelineCtx) -> ValidationReport {
    validate(&ctx.effective_input())
}

/// Run every stage on a preloaded context.
pub fn run_with_ctx(ctx: &PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    let input = ctx.effective_input();

    // VALIDATE
    let report = validate(&input);
    for issue in report.warnings() {
        warn!(code = issue.code, "{issue}");
    }
    info!(stage = "validate", pass = report.pass, issues = report.issues.len(), "input validated");
    if !report.pass {
        return Err(PipelineError::Validate(report));
    }

    // CLASSIFY … SUMMARIZE
    let eval = evaluate(&input)?;

    // BUILD
    let inputs = ResultInputs {
        engine: &ctx.engine_meta,
        input_sha256: &ctx.loaded.input_sha256,
        report_id: input.report_id.as_deref(),
        order_no: input.order_no.as_deref(),
    };
    let evaluation =
        build_evaluation_doc(inputs, &eval, &report).map_err(|e| PipelineError::Build(e.to_string()))?;
    info!(
        stage = "build",
        id = hasher::short_id(&evaluation.id, 12),
        verdict = %evaluation.body.verdict.overall,
        "evaluation built"
    );

    Ok(PipelineOutputs { evaluation, report })
}

/// Convenience entry: load a local input file, then run the pipeline.
pub fn run_from_path(path: &Path, overrides: LotOverrides) -> Result<PipelineOutputs, PipelineError> {
    let loaded = loader::load_input(path)?;
    info!(stage = "load", path = %path.display(), input_sha256 = hasher::short_id(&loaded.input_sha256, 12), "input loaded");
    let ctx = PipelineCtx { overrides, ..PipelineCtx::new(loaded) };
    run_with_ctx(&ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loaded(v: serde_json::Value) -> LoadedInput {
        loader::parse_input_value(v).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "order_no": "UA-1",
            "lot": { "lot_size": 500, "inspection_level": "II", "sampling_type": "normal" },
            "defects": [ { "severity": "major", "quantity": 4 } ],
            "buyer_rules": [ { "prefix": "ua", "buyer": "Under Armour" } ]
        })
    }

    #[test]
    fn engine_identifiers_carry_the_crate_version() {
        let m = engine_identifiers();
        assert_eq!(m.version, env!("CARGO_PKG_VERSION"));
        assert!(!m.build.is_empty());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut ctx = PipelineCtx::new(loaded(sample()));
        assert!(ctx.overrides.is_empty());
        ctx.overrides = LotOverrides { lot_size: Some(40), ..Default::default() };
        let input = ctx.effective_input();
        assert_eq!(input.lot.lot_size, 40);
        assert_eq!(input.lot.inspection_level, "II");
        assert_eq!(ctx.loaded.input.lot.lot_size, 500);
    }

    #[test]
    fn run_produces_a_failing_verdict() {
        let out = run_with_ctx(&PipelineCtx::new(loaded(sample()))).unwrap();
        let doc = out.evaluation;
        assert!(doc.id.starts_with("EVAL:"));
        assert!(!doc.body.verdict.is_pass());
        assert_eq!(doc.body.buyer.as_deref(), Some("Under Armour"));
        assert!(out.report.pass);
    }

    #[test]
    fn overrides_flow_into_the_document() {
        let mut ctx = PipelineCtx::new(loaded(sample()));
        ctx.overrides.sampling_type = Some("tightened".into());
        let doc = run_with_ctx(&ctx).unwrap().evaluation;
        assert_eq!(doc.body.lot.sampling_type, qa_core::SamplingType::Tightened);
    }

    #[test]
    fn validation_errors_stop_the_run() {
        let mut ctx = PipelineCtx::new(loaded(sample()));
        ctx.overrides.inspection_level = Some("IV".into());
        match run_with_ctx(&ctx) {
            Err(PipelineError::Validate(r)) => {
                assert!(!r.pass);
                assert_eq!(r.errors().count(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!validate_ctx(&ctx).pass);
    }

    #[test]
    fn io_errors_are_mapped() {
        let e: PipelineError = IoError::Schema("/lot: missing".into()).into();
        assert!(matches!(e, PipelineError::Schema(_)));
        let e: PipelineError = IoError::Path("nope".into()).into();
        assert_eq!(e.to_string(), "io: path: nope");
    }
}
