//! Location heatmap and per-inspector defect rates.

use std::collections::BTreeMap;

use qa_core::rounding::percent_one_decimal_tenths;
use qa_core::{CategoryTally, DefectRecord, EvalSettings};

use crate::tally::{aggregate, GroupBy};

/// Defect quantity per garment location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationHeatmap {
    pub by_location: BTreeMap<u32, CategoryTally>,
    /// Records that carry no location number.
    pub unlocated: CategoryTally,
}

impl LocationHeatmap {
    /// Location with the highest total quantity; lowest number on ties.
    pub fn hottest(&self) -> Option<u32> {
        self.by_location
            .iter()
            .filter(|(_, t)| !t.is_zero())
            .max_by(|a, b| a.1.total().cmp(&b.1.total()).then(b.0.cmp(a.0)))
            .map(|(&loc, _)| loc)
    }
}

pub fn location_heatmap(records: &[DefectRecord]) -> LocationHeatmap {
    let mut out = LocationHeatmap::default();
    for r in records {
        let slot = match r.location_no {
            Some(loc) => out.by_location.entry(loc).or_default(),
            None => &mut out.unlocated,
        };
        slot.add(r.category, u64::from(r.quantity));
    }
    out
}

/// One inspector's defects and rate over their inspected quantity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectorRow {
    pub inspector: String,
    pub tally: CategoryTally,
    pub total: u64,
    /// `total / inspected_qty_per_inspector` in tenths of a percent.
    pub defect_rate_tenths_pct: u64,
}

/// Rows ordered by inspector name; records without an inspector form the
/// `"unassigned"` row.
pub fn inspector_summary(records: &[DefectRecord], settings: &EvalSettings) -> Vec<InspectorRow> {
    let den = u64::from(settings.inspected_qty_per_inspector);
    aggregate(records, GroupBy::Inspector)
        .into_iter()
        .map(|(inspector, tally)| {
            let total = tally.total();
            InspectorRow {
                inspector,
                tally,
                total,
                defect_rate_tenths_pct: percent_one_decimal_tenths(total, den).unwrap_or(0),
            }
        })
        .collect()
}
