//! Build the canonical `evaluation.json` document.
//!
//! The id is `EVAL:` + sha256 of the canonical bytes of the document body
//! (every field except `id`). Arrays are emitted in a stable order: inspector
//! rows by name, measurement rows by size order, histogram buckets ascending,
//! warnings by record position.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use qa_core::rounding::format_tenths_pct;
use qa_core::{
    AqlLimit, Category, CategoryTally, ClassificationWarning, CodeLetter, InspectionLevel,
    SamplingType, Verdict,
};
use qa_io::{hasher, IoError};

use crate::evaluate::Evaluation;
use crate::validate::ValidationReport;
use crate::EngineMeta;

// ---------------------------------------------------------------------------------------------
// Document types (typed mirror of evaluation.json)
// ---------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDoc {
    /// "EVAL:<hex64>"
    pub id: String,
    #[serde(flatten)]
    pub body: EvaluationBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationBody {
    pub engine: EngineMeta,
    pub input_sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    pub lot: LotBlock,
    pub limits: BTreeMap<Category, AqlLimit>,
    pub tally: CategoryTally,
    pub verdict: Verdict,
    pub by_config_key: BTreeMap<String, CategoryTally>,
    pub heatmap: HeatmapBlock,
    pub inspectors: Vec<InspectorBlock>,
    pub measurements: MeasurementBlock,
    pub unclassified_count: u64,
    pub warnings: Vec<ClassificationWarning>,
    pub validation_warnings: Vec<IssueBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotBlock {
    pub lot_size: i64,
    pub inspection_level: InspectionLevel,
    pub sampling_type: SamplingType,
    pub code_letter: CodeLetter,
    /// Units to draw: the largest per-category sample size.
    pub sample_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapBlock {
    /// Ascending `location_no`.
    pub by_location: Vec<LocationBlock>,
    pub unlocated: CategoryTally,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hottest: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationBlock {
    pub location_no: u32,
    pub tally: CategoryTally,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorBlock {
    pub inspector: String,
    pub tally: CategoryTally,
    pub total: u64,
    pub defect_rate_tenths_pct: u64,
    /// Display form of the rate, e.g. "15.0%".
    pub defect_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementBlock {
    pub rows: Vec<SizeRowBlock>,
    pub out_of_tolerance: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRowBlock {
    pub size: String,
    pub count: u64,
    pub within: u64,
    pub above: u64,
    pub below: u64,
    pub histogram: Vec<BucketBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketBlock {
    pub bucket: i64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueBlock {
    pub code: String,
    #[serde(rename = "where")]
    pub where_: String,
    pub message: String,
}

// ---------------------------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------------------------

/// Identity fields of the run that are not computed by the evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ResultInputs<'a> {
    pub engine: &'a EngineMeta,
    pub input_sha256: &'a str,
    pub report_id: Option<&'a str>,
    pub order_no: Option<&'a str>,
}

pub fn build_evaluation_doc(
    inputs: ResultInputs<'_>,
    eval: &Evaluation,
    report: &ValidationReport,
) -> Result<EvaluationDoc, IoError> {
    let body = EvaluationBody {
        engine: inputs.engine.clone(),
        input_sha256: inputs.input_sha256.to_string(),
        report_id: inputs.report_id.map(str::to_string),
        order_no: inputs.order_no.map(str::to_string),
        buyer: eval.buyer.clone(),
        lot: LotBlock {
            lot_size: eval.lot.lot_size,
            inspection_level: eval.lot.inspection_level,
            sampling_type: eval.lot.sampling_type,
            code_letter: eval.limits.code_letter,
            sample_size: eval.limits.sample_size(),
        },
        limits: eval.limits.per_category.clone(),
        tally: eval.tally,
        verdict: eval.verdict.clone(),
        by_config_key: eval.by_config_key.clone(),
        heatmap: HeatmapBlock {
            by_location: eval
                .heatmap
                .by_location
                .iter()
                .map(|(&location_no, &tally)| LocationBlock { location_no, tally })
                .collect(),
            unlocated: eval.heatmap.unlocated,
            hottest: eval.heatmap.hottest(),
        },
        inspectors: eval
            .inspectors
            .iter()
            .map(|r| InspectorBlock {
                inspector: r.inspector.clone(),
                tally: r.tally,
                total: r.total,
                defect_rate_tenths_pct: r.defect_rate_tenths_pct,
                defect_rate: format_tenths_pct(r.defect_rate_tenths_pct),
            })
            .collect(),
        measurements: MeasurementBlock {
            rows: eval
                .measurements
                .rows
                .iter()
                .map(|r| SizeRowBlock {
                    size: r.size.clone(),
                    count: r.count,
                    within: r.within,
                    above: r.above,
                    below: r.below,
                    histogram: r
                        .histogram
                        .iter()
                        .map(|(&bucket, &count)| BucketBlock { bucket, count })
                        .collect(),
                })
                .collect(),
            out_of_tolerance: eval.measurements.out_of_tolerance(),
            skipped: eval.measurements.skipped,
        },
        unclassified_count: eval.batch.unclassified_count() as u64,
        warnings: eval.batch.warnings.clone(),
        validation_warnings: report
            .warnings()
            .map(|i| IssueBlock {
                code: i.code.to_string(),
                where_: i.where_.to_string(),
                message: i.message.clone(),
            })
            .collect(),
    };

    let id = hasher::eval_id_from_canonical(&body)?;
    Ok(EvaluationDoc { id, body })
}

/// Recompute the id of a document and compare it with the stored one.
pub fn verify_id(doc: &EvaluationDoc) -> Result<bool, IoError> {
    Ok(hasher::eval_id_from_canonical(&doc.body)? == doc.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::evaluate;
    use crate::validate::validate;
    use qa_core::{EvalSettings, MeasurementRecord, RawDefect};
    use qa_io::loader::{InspectionInput, RawLot};
    use serde_json::json;

    fn engine() -> EngineMeta {
        EngineMeta {
            vendor: "acme".into(),
            name: "qa_engine".into(),
            version: "0.1.0".into(),
            build: "test".into(),
        }
    }

    fn input() -> InspectionInput {
        InspectionInput {
            report_id: Some("R-9".into()),
            order_no: None,
            lot: RawLot {
                lot_size: 500,
                inspection_level: "II".into(),
                sampling_type: "normal".into(),
                aql: Default::default(),
            },
            defects: vec![
                RawDefect {
                    severity: "minor".into(),
                    name: "loose thread".into(),
                    quantity: 3,
                    location_no: Some(2),
                    config_key: None,
                    inspector: Some("bo".into()),
                },
                RawDefect {
                    severity: "??".into(),
                    name: "stain".into(),
                    quantity: 1,
                    location_no: None,
                    config_key: None,
                    inspector: Some("bo".into()),
                },
            ],
            measurements: vec![MeasurementRecord {
                size: "M".into(),
                point: "chest".into(),
                spec: 50.0,
                measured: 50.6,
                tolerance_minus: 0.5,
                tolerance_plus: 0.5,
            }],
            reference_sizes: vec!["S".into(), "M".into()],
            buyer_rules: Vec::new(),
            settings: EvalSettings::default(),
        }
    }

    fn build(i: &InspectionInput) -> EvaluationDoc {
        let eval = evaluate(i).unwrap();
        let report = validate(i);
        let meta = engine();
        let inputs = ResultInputs {
            engine: &meta,
            input_sha256: "00",
            report_id: i.report_id.as_deref(),
            order_no: i.order_no.as_deref(),
        };
        build_evaluation_doc(inputs, &eval, &report).unwrap()
    }

    #[test]
    fn id_is_prefixed_and_reproducible() {
        let a = build(&input());
        let b = build(&input());
        assert!(a.id.starts_with("EVAL:"));
        assert_eq!(a.id.len(), "EVAL:".len() + 64);
        assert_eq!(a, b);
        assert!(verify_id(&a).unwrap());
    }

    #[test]
    fn id_changes_with_content() {
        let a = build(&input());
        let mut other = input();
        other.defects[0].quantity = 4;
        assert_ne!(a.id, build(&other).id);
    }

    #[test]
    fn tampered_document_fails_verification() {
        let mut doc = build(&input());
        doc.body.tally.minor += 1;
        assert!(!verify_id(&doc).unwrap());
    }

    #[test]
    fn document_shape() {
        let doc = build(&input());
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["report_id"], json!("R-9"));
        assert!(v.get("order_no").is_none());
        assert!(v.get("buyer").is_none());
        assert_eq!(v["lot"]["code_letter"], json!("H"));
        assert_eq!(v["lot"]["sample_size"], json!(50));
        assert_eq!(v["tally"], json!({"minor": 4, "major": 0, "critical": 0}));
        assert_eq!(v["verdict"]["overall"], json!("pass"));
        assert_eq!(v["unclassified_count"], json!(1));
        assert_eq!(v["warnings"][0]["record_index"], json!(1));
        assert_eq!(v["warnings"][0]["kind"], json!("unrecognized_severity"));
        assert_eq!(v["heatmap"]["by_location"], json!([{"location_no": 2, "tally": {"minor": 3, "major": 0, "critical": 0}}]));
        assert_eq!(v["heatmap"]["hottest"], json!(2));
        assert_eq!(v["inspectors"][0]["defect_rate"], json!("20.0%"));
        assert_eq!(v["measurements"]["out_of_tolerance"], json!(1));
        assert_eq!(v["measurements"]["rows"][0]["above"], json!(1));
        assert_eq!(v["validation_warnings"], json!([]));
    }
}
