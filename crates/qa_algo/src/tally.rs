//! Tally Aggregator: sum classified quantities per category, per group.
//!
//! - `GroupBy::Overall` always yields exactly one `"overall"` group, even for
//!   an empty input (all-zero counts).
//! - Other groupings only report groups that received records, unless the
//!   caller declares them via [`aggregate_declared`].
//! - Records lacking the grouped attribute land in `"unassigned"`.
//! - Output is keyed by `BTreeMap`, so it is independent of record order.

use std::collections::BTreeMap;

use qa_core::{CategoryTally, DefectRecord, GroupKey, OVERALL_GROUP, UNASSIGNED_GROUP};

/// Key selector for sub-group tallies.
#[derive(Clone, Copy)]
pub enum GroupBy<'a> {
    Overall,
    /// Line/table/color composite.
    ConfigKey,
    Location,
    Inspector,
    Custom(&'a dyn Fn(&DefectRecord) -> Option<GroupKey>),
}

impl Default for GroupBy<'_> {
    fn default() -> Self {
        GroupBy::Overall
    }
}

impl GroupBy<'_> {
    fn key_of(&self, r: &DefectRecord) -> GroupKey {
        let key = match self {
            GroupBy::Overall => Some(OVERALL_GROUP.to_string()),
            GroupBy::ConfigKey => r.config_key.clone(),
            GroupBy::Location => r.location_no.map(|n| n.to_string()),
            GroupBy::Inspector => r.inspector.clone(),
            GroupBy::Custom(f) => f(r),
        };
        match key {
            Some(k) if !k.trim().is_empty() => k,
            _ => UNASSIGNED_GROUP.to_string(),
        }
    }
}

/// Per-group category tallies.
pub fn aggregate(records: &[DefectRecord], group_by: GroupBy<'_>) -> BTreeMap<GroupKey, CategoryTally> {
    let mut out: BTreeMap<GroupKey, CategoryTally> = BTreeMap::new();
    if matches!(group_by, GroupBy::Overall) {
        out.insert(OVERALL_GROUP.to_string(), CategoryTally::default());
    }
    for r in records {
        out.entry(group_by.key_of(r))
            .or_default()
            .add(r.category, u64::from(r.quantity));
    }
    out
}

/// Like [`aggregate`], but every key in `declared` is present (zero if no records).
pub fn aggregate_declared<S: AsRef<str>>(
    records: &[DefectRecord],
    group_by: GroupBy<'_>,
    declared: &[S],
) -> BTreeMap<GroupKey, CategoryTally> {
    let mut out = aggregate(records, group_by);
    for k in declared {
        out.entry(k.as_ref().to_string()).or_default();
    }
    out
}

/// Overall tally (the `"overall"` group of `GroupBy::Overall`).
pub fn overall(records: &[DefectRecord]) -> CategoryTally {
    records.iter().fold(CategoryTally::default(), |mut t, r| {
        t.add(r.category, u64::from(r.quantity));
        t
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qa_core::Category;

    fn rec(category: Category, qty: u32, key: Option<&str>) -> DefectRecord {
        DefectRecord { config_key: key.map(str::to_string), ..DefectRecord::new(category, "x", qty) }
    }

    #[test]
    fn empty_input_yields_zero_overall() {
        let t = aggregate(&[], GroupBy::Overall);
        assert_eq!(t.len(), 1);
        assert_eq!(t[OVERALL_GROUP], CategoryTally::default());
        assert!(aggregate(&[], GroupBy::ConfigKey).is_empty());
    }

    #[test]
    fn sums_per_category_and_group() {
        let rs = vec![
            rec(Category::Major, 2, Some("L1")),
            rec(Category::Major, 1, Some("L2")),
            rec(Category::Minor, 5, Some("L1")),
            rec(Category::Critical, 1, None),
        ];
        let all = aggregate(&rs, GroupBy::Overall);
        assert_eq!(all[OVERALL_GROUP], CategoryTally { minor: 5, major: 3, critical: 1 });

        let by_key = aggregate(&rs, GroupBy::ConfigKey);
        assert_eq!(by_key["L1"], CategoryTally { minor: 5, major: 2, critical: 0 });
        assert_eq!(by_key["L2"], CategoryTally { minor: 0, major: 1, critical: 0 });
        assert_eq!(by_key[UNASSIGNED_GROUP], CategoryTally { minor: 0, major: 0, critical: 1 });
    }

    #[test]
    fn declared_groups_report_zero() {
        let rs = vec![rec(Category::Minor, 1, Some("L1"))];
        let t = aggregate_declared(&rs, GroupBy::ConfigKey, &["L1", "L9"]);
        assert_eq!(t["L9"], CategoryTally::default());
        assert_eq!(t["L1"].minor, 1);
    }

    #[test]
    fn custom_key_fn() {
        let by_name = |r: &DefectRecord| Some(r.name.to_uppercase());
        let rs = vec![rec(Category::Minor, 3, None)];
        let t = aggregate(&rs, GroupBy::Custom(&by_name));
        assert_eq!(t["X"].minor, 3);
    }

    fn arb_record() -> impl Strategy<Value = DefectRecord> {
        (0usize..3, 0u32..1000, prop::option::of(prop::sample::select(vec!["L1", "L2", "L3"])))
            .prop_map(|(c, q, k)| rec(Category::ALL[c], q, k))
    }

    proptest! {
        #[test]
        fn tally_matches_filtered_sum(rs in prop::collection::vec(arb_record(), 0..60)) {
            let grouped = aggregate(&rs, GroupBy::ConfigKey);
            for (key, tally) in &grouped {
                for cat in Category::ALL {
                    let expected: u64 = rs.iter()
                        .filter(|r| r.category == cat)
                        .filter(|r| r.config_key.as_deref().unwrap_or(UNASSIGNED_GROUP) == key)
                        .map(|r| u64::from(r.quantity))
                        .sum();
                    prop_assert_eq!(tally.get(cat), expected);
                }
            }
            let all = aggregate(&rs, GroupBy::Overall);
            prop_assert_eq!(all[OVERALL_GROUP], overall(&rs));
        }

        #[test]
        fn tally_is_order_independent(
            (rs, shuffled) in prop::collection::vec(arb_record(), 0..60)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            prop_assert_eq!(aggregate(&rs, GroupBy::ConfigKey), aggregate(&shuffled, GroupBy::ConfigKey));
            prop_assert_eq!(overall(&rs), overall(&shuffled));
        }
    }
}
