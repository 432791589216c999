//! Embedded JSON Schemas (Draft 2020-12) and validation.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::IoError;

/// Errors listed in one `IoError::Schema` message, at most.
const MAX_REPORTED: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    InspectionInput,
}

impl SchemaKind {
    pub fn source(self) -> &'static str {
        match self {
            SchemaKind::InspectionInput => include_str!("../schemas/inspection_input.schema.json"),
        }
    }
}

/// Validate `instance` against the schema; every violation is listed as
/// `<instance pointer>: <message>`.
pub fn validate_value(kind: SchemaKind, instance: &Value) -> Result<(), IoError> {
    let schema_json: Value = serde_json::from_str(kind.source())?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(&schema_json)
        .map_err(|e| IoError::Schema(format!("{kind:?} schema does not compile: {e}")))?;

    let result = compiled.validate(instance);
    if let Err(errors) = result {
        let msgs: Vec<String> = errors
            .take(MAX_REPORTED)
            .map(|e| {
                let ptr = e.instance_path.to_string();
                let ptr = if ptr.is_empty() { "/".to_string() } else { ptr };
                format!("{ptr}: {e}")
            })
            .collect();
        return Err(IoError::Schema(msgs.join("; ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "lot": { "lot_size": 500, "inspection_level": "II", "sampling_type": "normal" },
            "defects": [ { "severity": "Major", "name": "Open seam", "quantity": 2 } ]
        })
    }

    #[test]
    fn minimal_input_is_valid() {
        validate_value(SchemaKind::InspectionInput, &minimal()).unwrap();
    }

    #[test]
    fn full_input_is_valid() {
        let v = json!({
            "report_id": "R-1",
            "order_no": "UA-77",
            "lot": {
                "lot_size": 1200, "inspection_level": "III", "sampling_type": "tightened",
                "aql": { "critical": 0, "major": "1.5", "minor": null }
            },
            "defects": [
                { "category": "critical", "quantity": 1, "location_no": 3, "inspector": "ana" }
            ],
            "measurements": [
                { "size": "M", "point": "chest", "spec": 50, "measured": 50.5,
                  "tolerance_minus": 1, "tolerance_plus": 1 }
            ],
            "reference_sizes": ["S", "M"],
            "buyer_rules": [ { "prefix": "UA", "buyer": "Under Armour" } ],
            "settings": { "inspected_qty_per_inspector": 32, "histogram_step": 0.5 }
        });
        validate_value(SchemaKind::InspectionInput, &v).unwrap();
    }

    #[test]
    fn missing_lot_and_unknown_fields_are_reported() {
        let v = json!({ "defects": [], "colour": "red" });
        let err = validate_value(SchemaKind::InspectionInput, &v).unwrap_err();
        assert!(matches!(err, IoError::Schema(_)));
    }

    #[test]
    fn defect_needs_a_severity_and_integer_quantity() {
        let mut v = minimal();
        v["defects"] = json!([{ "name": "x", "quantity": 1 }]);
        assert!(validate_value(SchemaKind::InspectionInput, &v).is_err());

        v["defects"] = json!([{ "severity": "minor", "quantity": 1.5 }]);
        let err = validate_value(SchemaKind::InspectionInput, &v).unwrap_err().to_string();
        assert!(err.contains("/defects/0/quantity"), "{err}");
    }

    #[test]
    fn settings_domain_is_checked() {
        let mut v = minimal();
        v["settings"] = json!({ "inspected_qty_per_inspector": 0 });
        assert!(validate_value(SchemaKind::InspectionInput, &v).is_err());
    }
}
