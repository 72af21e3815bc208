//! Structural validation of bulk payloads.

use knowledge_schema::{
    DifficultyLevel, Kind, NodeType, RelationshipStrength, RelationshipType, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NODE_REQUIRED: &[&str] = &["id", "name", "node_type", "description"];
const RELATIONSHIP_REQUIRED: &[&str] = &["id", "source_id", "target_id", "relationship_type"];

/// Problems found in a payload. Errors block import; warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{path}: {message}"));
    }
}

/// Check a payload's shape, required fields and enum values.
pub fn validate_payload(payload: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(root) = payload.as_object() else {
        report.error("payload", "expected a JSON object");
        return report;
    };

    if !root.contains_key("metadata") {
        report.warnings.push("missing 'metadata' section".to_string());
    }

    match root.get("nodes") {
        None => report.errors.push("missing 'nodes' section".to_string()),
        Some(Value::Array(nodes)) => {
            for (i, node) in nodes.iter().enumerate() {
                validate_element(&mut report, &format!("nodes[{i}]"), node, NODE_REQUIRED, |rec| {
                    let mut errors = Vec::new();
                    check_kind::<NodeType>(rec, &mut errors);
                    check_kind::<DifficultyLevel>(rec, &mut errors);
                    errors
                });
            }
        }
        Some(_) => report.error("nodes", "expected an array"),
    }

    match root.get("relationships") {
        None => report
            .warnings
            .push("missing 'relationships' section".to_string()),
        Some(Value::Array(relationships)) => {
            for (i, rel) in relationships.iter().enumerate() {
                let path = format!("relationships[{i}]");
                validate_element(&mut report, &path, rel, RELATIONSHIP_REQUIRED, |rec| {
                    let mut errors = Vec::new();
                    check_kind::<RelationshipType>(rec, &mut errors);
                    check_kind::<RelationshipStrength>(rec, &mut errors);
                    errors
                });
            }
        }
        Some(_) => report.error("relationships", "expected an array"),
    }

    report
}

fn validate_element<F>(
    report: &mut ValidationReport,
    path: &str,
    element: &Value,
    required: &[&str],
    check_kinds: F,
) where
    F: Fn(&Map<String, Value>) -> Vec<ValidationError>,
{
    let Some(record) = element.as_object() else {
        report.error(path, "expected an object");
        return;
    };

    for field in required {
        if record.get(*field).map_or(true, Value::is_null) {
            report.error(path, ValidationError::missing(*field));
        }
    }
    for err in check_kinds(record) {
        report.error(path, err);
    }
}

/// Flag a present, non-null enum field whose value is not recognized.
fn check_kind<K: Kind>(record: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    match record.get(K::FIELD) {
        None | Some(Value::Null) => {}
        Some(Value::String(value)) => {
            if let Err(err) = K::parse(value) {
                errors.push(err);
            }
        }
        Some(other) => errors.push(ValidationError::invalid(K::FIELD, other.to_string())),
    }
}
