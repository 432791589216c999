//! Structural & semantic validation before any computation.
//!
//! Runs after schema validation (which guarantees shape) and before the AQL
//! resolver. Every problem is collected so that one run reports all of them;
//! `pass` is false iff at least one issue is an `Error`. Issue order is
//! stable: (code, where, message).

use std::collections::BTreeSet;
use std::fmt;

use qa_algo::sizes::strip_fit_suffix;
use qa_core::{AqlPlan, Category, ConfigError, EvalSettings, InspectionLevel, SamplingType};
use qa_io::loader::{InspectionInput, RawLot};

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityRef {
    Lot(&'static str),
    Settings(&'static str),
    ReferenceSize(usize),
    Measurement(usize),
    BuyerRule(usize),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Lot(field) => write!(f, "lot.{field}"),
            EntityRef::Settings(field) => write!(f, "settings.{field}"),
            EntityRef::ReferenceSize(i) => write!(f, "reference_sizes[{i}]"),
            EntityRef::Measurement(i) => write!(f, "measurements[{i}]"),
            EntityRef::BuyerRule(i) => write!(f, "buyer_rules[{i}]"),
        }
    }
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub where_: EntityRef,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.where_, self.message)
    }
}

/// Deterministic report: pass = (no Error).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// One-line digest of the errors, e.g. for an error message.
    pub fn summary(&self) -> String {
        let errors: Vec<String> = self.errors().map(ToString::to_string).collect();
        format!("{} error(s): {}", errors.len(), errors.join("; "))
    }
}

/// Top-level entry point.
pub fn validate(input: &InspectionInput) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_lot(&input.lot));
    issues.extend(check_settings(&input.settings));
    issues.extend(check_reference_sizes(&input.reference_sizes));
    issues.extend(check_measurements(input));
    issues.extend(check_buyer_rules(input));

    sort_issues_stably(&mut issues);

    ValidationReport { pass: !issues.iter().any(|i| i.severity == Severity::Error), issues }
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

fn error(code: &'static str, where_: EntityRef, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue { severity: Severity::Error, code, message: message.into(), where_ }
}

fn warning(code: &'static str, where_: EntityRef, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue { severity: Severity::Warning, code, message: message.into(), where_ }
}

/// Errors:
/// - "Lot.SizeNonPositive", "Lot.InspectionLevelUnknown", "Lot.SamplingTypeUnknown"
/// Warnings:
/// - "Lot.NoCategoryEvaluated" when the AQL plan disables every category
fn check_lot(lot: &RawLot) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if lot.lot_size <= 0 {
        let e = ConfigError::InvalidLotSize(lot.lot_size);
        issues.push(error("Lot.SizeNonPositive", EntityRef::Lot("lot_size"), e.to_string()));
    }
    if let Err(e) = lot.inspection_level.parse::<InspectionLevel>() {
        issues.push(error("Lot.InspectionLevelUnknown", EntityRef::Lot("inspection_level"), e.to_string()));
    }
    if let Err(e) = lot.sampling_type.parse::<SamplingType>() {
        issues.push(error("Lot.SamplingTypeUnknown", EntityRef::Lot("sampling_type"), e.to_string()));
    }
    if no_category_evaluated(&lot.aql) {
        issues.push(warning(
            "Lot.NoCategoryEvaluated",
            EntityRef::Lot("aql"),
            "every category is disabled; the lot always passes",
        ));
    }
    issues
}

fn no_category_evaluated(plan: &AqlPlan) -> bool {
    Category::ALL.iter().all(|&c| plan.get(c).is_none())
}

/// Errors:
/// - "Settings.Invalid"
fn check_settings(settings: &EvalSettings) -> Vec<ValidationIssue> {
    match settings.validate() {
        Ok(()) => Vec::new(),
        Err(e) => {
            let field = if settings.inspected_qty_per_inspector == 0 {
                "inspected_qty_per_inspector"
            } else {
                "histogram_step"
            };
            vec![error("Settings.Invalid", EntityRef::Settings(field), e.to_string())]
        }
    }
}

/// Warnings:
/// - "Sizes.DuplicateReference" when two entries name the same size
fn check_reference_sizes(reference: &[String]) -> Vec<ValidationIssue> {
    let mut seen = BTreeSet::new();
    let mut issues = Vec::new();
    for (i, label) in reference.iter().enumerate() {
        let key = strip_fit_suffix(label).to_lowercase();
        if !seen.insert(key) {
            issues.push(warning(
                "Sizes.DuplicateReference",
                EntityRef::ReferenceSize(i),
                format!("duplicate reference size '{label}'; first position is used"),
            ));
        }
    }
    issues
}

/// Errors:
/// - "Measurement.ToleranceNegative"
/// Warnings:
/// - "Measurement.SizeNotInReference" (only when a reference list is given)
fn check_measurements(input: &InspectionInput) -> Vec<ValidationIssue> {
    let known: BTreeSet<String> = input
        .reference_sizes
        .iter()
        .map(|s| strip_fit_suffix(s).to_lowercase())
        .collect();

    let mut issues = Vec::new();
    for (i, m) in input.measurements.iter().enumerate() {
        if m.tolerance_minus < 0.0 || m.tolerance_plus < 0.0 {
            issues.push(error(
                "Measurement.ToleranceNegative",
                EntityRef::Measurement(i),
                format!("tolerances must be >= 0 (got -{} / +{})", m.tolerance_minus, m.tolerance_plus),
            ));
        }
        if !known.is_empty() && !known.contains(&strip_fit_suffix(&m.size).to_lowercase()) {
            issues.push(warning(
                "Measurement.SizeNotInReference",
                EntityRef::Measurement(i),
                format!("size '{}' is not in reference_sizes; it is ordered after them", m.size),
            ));
        }
    }
    issues
}

/// Warnings:
/// - "Buyer.EmptyPrefix" (rule never matches)
/// - "Buyer.DuplicatePrefix" (later rule never wins)
fn check_buyer_rules(input: &InspectionInput) -> Vec<ValidationIssue> {
    let mut seen = BTreeSet::new();
    let mut issues = Vec::new();
    for (i, rule) in input.buyer_rules.iter().enumerate() {
        let prefix = rule.prefix.trim().to_lowercase();
        if prefix.is_empty() {
            issues.push(warning("Buyer.EmptyPrefix", EntityRef::BuyerRule(i), "empty prefix never matches"));
        } else if !seen.insert(prefix) {
            issues.push(warning(
                "Buyer.DuplicatePrefix",
                EntityRef::BuyerRule(i),
                format!("prefix '{}' already mapped by an earlier rule", rule.prefix),
            ));
        }
    }
    issues
}

// ------------------------------------------------------------------------------------------------
// Utilities
// ------------------------------------------------------------------------------------------------

fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.where_.cmp(&b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_core::{BuyerRule, MeasurementRecord};

    fn input(level: &str, sampling: &str, lot_size: i64) -> InspectionInput {
        InspectionInput {
            report_id: None,
            order_no: None,
            lot: RawLot {
                lot_size,
                inspection_level: level.into(),
                sampling_type: sampling.into(),
                aql: AqlPlan::default(),
            },
            defects: Vec::new(),
            measurements: Vec::new(),
            reference_sizes: Vec::new(),
            buyer_rules: Vec::new(),
            settings: EvalSettings::default(),
        }
    }

    #[test]
    fn clean_input_passes() {
        let r = validate(&input("II", "normal", 500));
        assert!(r.pass);
        assert!(r.issues.is_empty());
    }

    #[test]
    fn collects_every_lot_error_in_stable_order() {
        let r = validate(&input("IV", "skip", 0));
        assert!(!r.pass);
        let codes: Vec<&str> = r.issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec!["Lot.InspectionLevelUnknown", "Lot.SamplingTypeUnknown", "Lot.SizeNonPositive"]
        );
        assert!(r.summary().starts_with("3 error(s): "));
    }

    #[test]
    fn disabled_plan_is_a_warning() {
        let mut i = input("I", "normal", 10);
        i.lot.aql = AqlPlan { critical: None, major: None, minor: None };
        let r = validate(&i);
        assert!(r.pass);
        assert_eq!(r.warnings().count(), 1);
        assert_eq!(r.issues[0].code, "Lot.NoCategoryEvaluated");
    }

    #[test]
    fn bad_settings_are_errors() {
        let mut i = input("II", "normal", 10);
        i.settings.histogram_step = -1.0;
        let r = validate(&i);
        assert!(!r.pass);
        assert_eq!(r.issues[0].where_, EntityRef::Settings("histogram_step"));
    }

    #[test]
    fn size_and_buyer_warnings() {
        let mut i = input("II", "normal", 10);
        i.reference_sizes = vec!["S".into(), "M".into(), "m (A)".into()];
        i.measurements = vec![MeasurementRecord {
            size: "XXL".into(),
            point: "waist".into(),
            spec: 1.0,
            measured: 1.0,
            tolerance_minus: 0.5,
            tolerance_plus: 0.5,
        }];
        i.buyer_rules = vec![
            BuyerRule { prefix: "UA".into(), buyer: "A".into() },
            BuyerRule { prefix: "ua ".into(), buyer: "B".into() },
            BuyerRule { prefix: " ".into(), buyer: "C".into() },
        ];
        let r = validate(&i);
        assert!(r.pass);
        let codes: Vec<String> = r.issues.iter().map(|x| format!("{}@{}", x.code, x.where_)).collect();
        assert_eq!(
            codes,
            vec![
                "Buyer.DuplicatePrefix@buyer_rules[1]",
                "Buyer.EmptyPrefix@buyer_rules[2]",
                "Measurement.SizeNotInReference@measurements[0]",
                "Sizes.DuplicateReference@reference_sizes[2]",
            ]
        );
    }
}
