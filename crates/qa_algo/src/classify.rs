//! Defect Classifier: raw severity text → `Category`.
//!
//! Contract:
//! - Severity is matched case-insensitively after trimming.
//! - Unknown severities classify as Minor with `unclassified = true` and a
//!   warning; the record is never dropped.
//! - Quantities are clamped into `0..=u32::MAX`, each clamp reported.

use qa_core::{Category, ClassificationWarning, DefectRecord, RawDefect, WarningKind};

/// Output of [`classify_all`]: records in input order plus indexed warnings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedBatch {
    pub records: Vec<DefectRecord>,
    pub warnings: Vec<ClassificationWarning>,
}

impl ClassifiedBatch {
    pub fn unclassified_count(&self) -> usize {
        self.records.iter().filter(|r| r.unclassified).count()
    }
}

/// Map a severity token to a category; `None` if unrecognized.
pub fn parse_severity(raw: &str) -> Option<Category> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "minor" | "mi" | "min" | "mn" | "1" => Some(Category::Minor),
        "major" | "ma" | "maj" | "mj" | "2" => Some(Category::Major),
        "critical" | "cr" | "crit" | "c" | "3" => Some(Category::Critical),
        _ => None,
    }
}

/// Classify one raw defect.
pub fn classify(raw: &RawDefect) -> (DefectRecord, Vec<WarningKind>) {
    let mut warnings = Vec::new();

    let (category, unclassified) = match parse_severity(&raw.severity) {
        Some(c) => (c, false),
        None => {
            warnings.push(WarningKind::UnrecognizedSeverity { raw: raw.severity.clone() });
            (Category::Minor, true)
        }
    };

    let quantity = if raw.quantity < 0 {
        warnings.push(WarningKind::NegativeQuantity { raw: raw.quantity });
        0
    } else {
        u32::try_from(raw.quantity).unwrap_or_else(|_| {
            warnings.push(WarningKind::QuantityOverflow { raw: raw.quantity });
            u32::MAX
        })
    };

    let record = DefectRecord {
        category,
        name: raw.name.trim().to_string(),
        quantity,
        location_no: raw.location_no,
        config_key: raw.config_key.clone(),
        inspector: raw.inspector.clone(),
        unclassified,
    };
    (record, warnings)
}

/// Classify a batch, preserving order; warnings carry the input position.
pub fn classify_all(raws: &[RawDefect]) -> ClassifiedBatch {
    let mut out = ClassifiedBatch { records: Vec::with_capacity(raws.len()), warnings: Vec::new() };
    for (record_index, raw) in raws.iter().enumerate() {
        let (record, kinds) = classify(raw);
        out.records.push(record);
        out.warnings
            .extend(kinds.into_iter().map(|kind| ClassificationWarning { record_index, kind }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(severity: &str, quantity: i64) -> RawDefect {
        RawDefect {
            severity: severity.into(),
            name: "Broken stitch".into(),
            quantity,
            location_no: Some(4),
            config_key: Some("L1/T2/NAVY".into()),
            inspector: None,
        }
    }

    #[test]
    fn recognizes_words_and_codes() {
        assert_eq!(parse_severity("MAJOR"), Some(Category::Major));
        assert_eq!(parse_severity(" Critical "), Some(Category::Critical));
        assert_eq!(parse_severity("mi"), Some(Category::Minor));
        assert_eq!(parse_severity("3"), Some(Category::Critical));
        assert_eq!(parse_severity("severe"), None);
        assert_eq!(parse_severity(""), None);
    }

    #[test]
    fn unknown_severity_is_minor_and_flagged() {
        let (rec, warnings) = classify(&raw("Cosmetic", 2));
        assert_eq!(rec.category, Category::Minor);
        assert!(rec.unclassified);
        assert_eq!(rec.quantity, 2);
        assert_eq!(warnings, vec![WarningKind::UnrecognizedSeverity { raw: "Cosmetic".into() }]);
    }

    #[test]
    fn keeps_grouping_attributes() {
        let (rec, warnings) = classify(&raw("major", 1));
        assert!(warnings.is_empty());
        assert_eq!(rec.location_no, Some(4));
        assert_eq!(rec.config_key.as_deref(), Some("L1/T2/NAVY"));
    }

    #[test]
    fn clamps_bad_quantities() {
        let (rec, w) = classify(&raw("minor", -3));
        assert_eq!(rec.quantity, 0);
        assert_eq!(w, vec![WarningKind::NegativeQuantity { raw: -3 }]);

        let big = i64::from(u32::MAX) + 1;
        let (rec, w) = classify(&raw("minor", big));
        assert_eq!(rec.quantity, u32::MAX);
        assert_eq!(w, vec![WarningKind::QuantityOverflow { raw: big }]);
    }

    #[test]
    fn batch_indexes_warnings_and_keeps_every_record() {
        let batch = classify_all(&[raw("major", 1), raw("??", 1), raw("bogus", -1)]);
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.unclassified_count(), 2);
        let idx: Vec<usize> = batch.warnings.iter().map(|w| w.record_index).collect();
        assert_eq!(idx, vec![1, 2, 2]);
    }
}
