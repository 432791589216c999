//! Loader: read a local inspection input, validate it against the embedded
//! Draft 2020-12 schema, and return a typed `InspectionInput` plus the
//! digest of its canonical bytes. No network I/O.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use qa_core::{AqlPlan, BuyerRule, ConfigError, EvalSettings, LotConfig, MeasurementRecord, RawDefect};

use crate::schema::{self, SchemaKind};
use crate::{hasher, IoError};

/// Inputs larger than this are rejected before parsing.
pub const MAX_INPUT_BYTES: u64 = 32 * 1024 * 1024;

// ----------------------------- Wire types -----------------------------

/// Lot section as written by the inspection form; level and sampling stay
/// text until `to_lot_config` so that unknown tokens surface as
/// `ConfigError`, not as JSON errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLot {
    pub lot_size: i64,
    pub inspection_level: String,
    pub sampling_type: String,
    #[serde(default)]
    pub aql: AqlPlan,
}

impl RawLot {
    pub fn to_lot_config(&self) -> Result<LotConfig, ConfigError> {
        Ok(LotConfig::parse(self.lot_size, &self.inspection_level, &self.sampling_type)?.with_aql(self.aql))
    }
}

/// One inspection report (mirrors `schemas/inspection_input.schema.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectionInput {
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub order_no: Option<String>,
    pub lot: RawLot,
    pub defects: Vec<RawDefect>,
    #[serde(default)]
    pub measurements: Vec<MeasurementRecord>,
    #[serde(default)]
    pub reference_sizes: Vec<String>,
    #[serde(default)]
    pub buyer_rules: Vec<BuyerRule>,
    #[serde(default)]
    pub settings: EvalSettings,
}

/// Validated input plus the sha256 of its canonical JSON bytes.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub input: InspectionInput,
    pub input_sha256: String,
}

// ----------------------------- Entry points -----------------------------

/// Read, schema-validate and parse an inspection input file.
pub fn load_input(path: &Path) -> Result<LoadedInput, IoError> {
    let v = read_json_value_with_limits(path)?;
    parse_input_value(v)
}

/// Schema-validate and parse an already-read JSON value.
pub fn parse_input_value(v: Value) -> Result<LoadedInput, IoError> {
    schema::validate_value(SchemaKind::InspectionInput, &v)?;
    let input_sha256 = hasher::sha256_canonical_value(&v)?;
    let input: InspectionInput = serde_json::from_value(v)?;
    Ok(LoadedInput { input, input_sha256 })
}

/// Read a local JSON file, refusing URLs, directories and oversized files.
pub fn read_json_value_with_limits(path: &Path) -> Result<Value, IoError> {
    let shown = path.display().to_string();
    if shown.contains("://") {
        return Err(IoError::Invalid(format!("offline only, not a local path: {shown}")));
    }
    let meta = fs::metadata(path).map_err(|e| IoError::Path(format!("{shown}: {e}")))?;
    if !meta.is_file() {
        return Err(IoError::Invalid(format!("not a file: {shown}")));
    }
    if meta.len() > MAX_INPUT_BYTES {
        return Err(IoError::Invalid(format!(
            "{shown}: {} bytes exceeds limit of {MAX_INPUT_BYTES}",
            meta.len()
        )));
    }
    let bytes = fs::read(path).map_err(|e| IoError::Path(format!("{shown}: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{shown}: {e}"),
    })
}
