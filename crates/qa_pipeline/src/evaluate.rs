//! Evaluation stages over a validated input:
//! classify → tally → resolve limits → decide → summarize.
//!
//! Pure apart from logging; the same input always yields the same
//! `Evaluation`.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use qa_algo::heatmap::{inspector_summary, location_heatmap, InspectorRow, LocationHeatmap};
use qa_algo::measurement::{measurement_summary, MeasurementSummary};
use qa_algo::tally::overall;
use qa_algo::{aggregate, classify_all, decide, determine_buyer, resolve_limits, ClassifiedBatch, GroupBy};
use qa_core::{AqlLimits, CategoryTally, ConfigError, GroupKey, LotConfig, Verdict};
use qa_io::loader::InspectionInput;

/// Everything computed for one inspection report.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub lot: LotConfig,
    pub batch: ClassifiedBatch,
    pub tally: CategoryTally,
    pub by_config_key: BTreeMap<GroupKey, CategoryTally>,
    pub limits: AqlLimits,
    pub verdict: Verdict,
    pub heatmap: LocationHeatmap,
    pub inspectors: Vec<InspectorRow>,
    pub measurements: MeasurementSummary,
    pub buyer: Option<String>,
}

pub fn evaluate(input: &InspectionInput) -> Result<Evaluation, ConfigError> {
    let lot = input.lot.to_lot_config()?;
    input.settings.validate()?;

    // CLASSIFY
    let batch = classify_all(&input.defects);
    for w in &batch.warnings {
        warn!(record = w.record_index, "{w}");
    }
    info!(
        stage = "classify",
        records = batch.records.len(),
        unclassified = batch.unclassified_count(),
        "defects classified"
    );

    // TALLY
    let tally = overall(&batch.records);
    let by_config_key = aggregate(&batch.records, GroupBy::ConfigKey);
    info!(
        stage = "tally",
        minor = tally.minor,
        major = tally.major,
        critical = tally.critical,
        groups = by_config_key.len(),
        "tallies aggregated"
    );

    // RESOLVE
    let limits = resolve_limits(&lot)?;
    for (category, l) in &limits.per_category {
        debug!(
            %category,
            aql = %l.aql,
            sample_size = l.sample_size,
            ac = l.accept_number,
            re = l.reject_number,
            "limit resolved"
        );
    }
    info!(
        stage = "resolve",
        code_letter = %limits.code_letter,
        sample_size = limits.sample_size(),
        "limits resolved"
    );

    // DECIDE
    let verdict = decide(&tally, &limits);
    info!(stage = "decide", overall = %verdict.overall, failing = ?verdict.failing_category, "verdict");

    // SUMMARIZE
    let heatmap = location_heatmap(&batch.records);
    let inspectors = inspector_summary(&batch.records, &input.settings);
    let measurements = measurement_summary(&input.measurements, &input.reference_sizes, &input.settings);
    let buyer = input
        .order_no
        .as_deref()
        .and_then(|o| determine_buyer(o, &input.buyer_rules))
        .map(str::to_string);
    info!(
        stage = "summarize",
        locations = heatmap.by_location.len(),
        inspectors = inspectors.len(),
        measured_sizes = measurements.rows.len(),
        skipped_measurements = measurements.skipped,
        "summaries built"
    );

    Ok(Evaluation {
        lot,
        batch,
        tally,
        by_config_key,
        limits,
        verdict,
        heatmap,
        inspectors,
        measurements,
        buyer,
    })
}
