//! Verdict Engine: tallies × limits → Pass/Fail.
//!
//! A category fails when its count reaches the reject number. The lot fails
//! when any evaluated category fails; the reported failing category is the
//! most severe one. Categories without a limit are not evaluated.

use std::collections::BTreeMap;

use qa_core::{AqlLimits, CategoryTally, CategoryVerdict, Status, Verdict};

pub fn decide(tally: &CategoryTally, limits: &AqlLimits) -> Verdict {
    let per_category: BTreeMap<_, _> = limits
        .per_category
        .iter()
        .map(|(&category, limit)| {
            let count = tally.get(category);
            let status = if count >= u64::from(limit.reject_number) {
                Status::Fail
            } else {
                Status::Pass
            };
            let v = CategoryVerdict {
                status,
                count,
                accept_number: limit.accept_number,
                reject_number: limit.reject_number,
            };
            (category, v)
        })
        .collect();

    // BTreeMap order is ascending severity; the last failure is the worst.
    let failing_category = per_category
        .iter()
        .rev()
        .find(|(_, v)| v.status.is_fail())
        .map(|(&c, _)| c);

    Verdict {
        overall: if failing_category.is_some() { Status::Fail } else { Status::Pass },
        failing_category,
        per_category,
    }
}
