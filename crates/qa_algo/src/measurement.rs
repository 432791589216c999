//! Measurement tolerance summary per size.
//!
//! A measurement is within tolerance when
//! `spec - tolerance_minus <= measured <= spec + tolerance_plus`.
//! Deviations land in histogram bucket `floor(deviation / step)`.
//! Both checks run on values rounded to thousandths, so a reading exactly on
//! a limit or a bucket edge is not pushed across it by float error.
//! Records with a non-finite number are skipped and counted.

use std::collections::BTreeMap;

use qa_core::{EvalSettings, MeasurementRecord};

use crate::sizes::sort_sizes;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeMeasurementRow {
    pub size: String,
    pub count: u64,
    pub within: u64,
    pub above: u64,
    pub below: u64,
    pub histogram: BTreeMap<i64, u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeasurementSummary {
    /// One row per distinct size label, in size order.
    pub rows: Vec<SizeMeasurementRow>,
    pub skipped: u64,
}

impl MeasurementSummary {
    pub fn out_of_tolerance(&self) -> u64 {
        self.rows.iter().map(|r| r.above + r.below).sum()
    }
}

/// Thousandths of a unit, half away from zero. `as` saturates.
fn milli(x: f64) -> i64 {
    (x * 1000.0).round() as i64
}

fn is_usable(m: &MeasurementRecord) -> bool {
    [m.spec, m.measured, m.tolerance_minus, m.tolerance_plus]
        .iter()
        .all(|v| v.is_finite())
}

pub fn measurement_summary<R: AsRef<str>>(
    records: &[MeasurementRecord],
    reference_sizes: &[R],
    settings: &EvalSettings,
) -> MeasurementSummary {
    let step = milli(settings.histogram_step).max(1);
    let mut by_size: BTreeMap<String, SizeMeasurementRow> = BTreeMap::new();
    let mut skipped = 0u64;

    for m in records {
        if !is_usable(m) {
            skipped += 1;
            continue;
        }
        let dev = milli(m.measured).saturating_sub(milli(m.spec));
        let row = by_size.entry(m.size.clone()).or_insert_with(|| SizeMeasurementRow {
            size: m.size.clone(),
            ..SizeMeasurementRow::default()
        });
        row.count += 1;
        if dev > milli(m.tolerance_plus).saturating_abs() {
            row.above += 1;
        } else if dev < -milli(m.tolerance_minus).saturating_abs() {
            row.below += 1;
        } else {
            row.within += 1;
        }
        let bucket = dev.div_euclid(step);
        *row.histogram.entry(bucket).or_default() += 1;
    }

    let labels: Vec<&str> = by_size.keys().map(String::as_str).collect();
    let order = sort_sizes(&labels, reference_sizes);
    let rows = order.into_iter().filter_map(|size| by_size.remove(&size)).collect();

    MeasurementSummary { rows, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(size: &str, spec: f64, measured: f64) -> MeasurementRecord {
        with_tol(size, spec, measured, 0.5)
    }

    fn with_tol(size: &str, spec: f64, measured: f64, tol: f64) -> MeasurementRecord {
        MeasurementRecord {
            size: size.into(),
            point: "chest".into(),
            spec,
            measured,
            tolerance_minus: tol,
            tolerance_plus: tol,
        }
    }

    #[test]
    fn counts_within_above_below() {
        let rs = vec![
            m("M", 50.0, 50.0),
            m("M", 50.0, 50.5),
            m("M", 50.0, 51.0),
            m("M", 50.0, 49.25),
        ];
        let s = measurement_summary(&rs, &["S", "M"], &EvalSettings::default());
        assert_eq!(s.rows.len(), 1);
        let row = &s.rows[0];
        assert_eq!((row.count, row.within, row.above, row.below), (4, 2, 1, 1));
        assert_eq!(s.out_of_tolerance(), 2);
        // 0.0 → 0, 0.5 → 2, 1.0 → 4, -0.75 → -3
        let buckets: Vec<(i64, u64)> = row.histogram.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(buckets, vec![(-3, 1), (0, 1), (2, 1), (4, 1)]);
    }

    #[test]
    fn rows_follow_size_order() {
        let rs = vec![m("XL", 1.0, 1.0), m("S (A)", 1.0, 1.0), m("M", 1.0, 1.0), m("3XL", 1.0, 1.0)];
        let s = measurement_summary(&rs, &["S", "M", "L", "XL"], &EvalSettings::default());
        let sizes: Vec<&str> = s.rows.iter().map(|r| r.size.as_str()).collect();
        assert_eq!(sizes, vec!["S (A)", "M", "XL", "3XL"]);
    }

    #[test]
    fn non_finite_records_are_skipped() {
        let rs = vec![m("M", f64::NAN, 1.0), m("M", 1.0, f64::INFINITY), m("M", 1.0, 1.0)];
        let s = measurement_summary(&rs, &["M"], &EvalSettings::default());
        assert_eq!(s.skipped, 2);
        assert_eq!(s.rows[0].count, 1);
    }

    #[test]
    fn step_controls_bucket_width() {
        let rs = vec![m("M", 0.0, 0.75)];
        let settings = EvalSettings { histogram_step: 0.5, ..EvalSettings::default() };
        let s = measurement_summary(&rs, &["M"], &settings);
        assert_eq!(s.rows[0].histogram.get(&1), Some(&1));
    }

    #[test]
    fn readings_on_the_limit_are_within() {
        // 10.4 - 10.1 and 19.9 - 20.2 are not exactly 0.3 in binary.
        let rs = vec![
            with_tol("M", 10.1, 10.4, 0.3),
            with_tol("M", 20.2, 19.9, 0.3),
            with_tol("M", 10.1, 10.401, 0.3),
            with_tol("M", 20.2, 19.899, 0.3),
        ];
        let s = measurement_summary(&rs, &["M"], &EvalSettings::default());
        let row = &s.rows[0];
        assert_eq!((row.within, row.above, row.below), (2, 1, 1));
    }

    #[test]
    fn readings_on_a_bucket_edge_open_that_bucket() {
        // 50.3 - 50.0 is 0.2999.. in binary; at step 0.1 it belongs to bucket 3.
        let settings = EvalSettings { histogram_step: 0.1, ..EvalSettings::default() };
        let rs = vec![m("M", 50.0, 50.3), m("M", 50.0, 49.7)];
        let s = measurement_summary(&rs, &["M"], &settings);
        let buckets: Vec<(i64, u64)> = s.rows[0].histogram.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(buckets, vec![(-3, 1), (3, 1)]);
    }
}
