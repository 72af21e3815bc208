//! Conversion between entities and store property maps.
//!
//! Collection fields are stored as JSON strings and decoded on read.
//! Relationship endpoints and type live in the graph structure, not in the
//! relationship's properties.

use knowledge_schema::{KnowledgeNode, KnowledgeRelationship, NodeUpdate};
use serde_json::Value;

use super::{Record, StoreError};

/// Fields stored as JSON-encoded strings.
pub const JSON_ENCODED_FIELDS: &[&str] = &["tags", "prerequisites", "properties", "examples"];

/// Relationship fields carried by the graph structure rather than as properties.
const STRUCTURAL_FIELDS: &[&str] = &["source_id", "target_id", "relationship_type"];

/// Property map for a node.
pub fn node_properties(node: &KnowledgeNode) -> Result<Record, StoreError> {
    encode_fields(node.to_record())
}

/// Property map for a relationship, without its endpoints and type.
pub fn relationship_properties(rel: &KnowledgeRelationship) -> Result<Record, StoreError> {
    let mut record = rel.to_record();
    for field in STRUCTURAL_FIELDS {
        record.remove(*field);
    }
    encode_fields(record)
}

/// Property map holding only the fields an update sets.
pub fn update_properties(update: &NodeUpdate) -> Result<Record, StoreError> {
    encode_fields(update.to_record())
}

/// Decode the node stored under `column` in a result row.
pub fn node_from_row(row: &Record, column: &str) -> Result<KnowledgeNode, StoreError> {
    let properties = column_object(row, column)?;
    let record = decode_fields(properties)?;
    KnowledgeNode::from_record(&Value::Object(record)).map_err(|e| StoreError::decode("node", e))
}

/// Decode a relationship row with columns `r`, `source_id`, `target_id` and
/// `relationship_type` (the upper-case label).
pub fn relationship_from_row(row: &Record) -> Result<KnowledgeRelationship, StoreError> {
    let mut record = decode_fields(column_object(row, "r")?)?;

    for field in ["source_id", "target_id"] {
        let value = row
            .get(field)
            .cloned()
            .ok_or_else(|| StoreError::decode("relationship row", format!("missing column '{field}'")))?;
        record.insert(field.to_string(), value);
    }

    let label = row
        .get("relationship_type")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::decode("relationship row", "missing column 'relationship_type'"))?;
    record.insert(
        "relationship_type".to_string(),
        Value::String(label.to_ascii_lowercase()),
    );

    KnowledgeRelationship::from_record(&Value::Object(record))
        .map_err(|e| StoreError::decode("relationship", e))
}

fn column_object(row: &Record, column: &str) -> Result<Record, StoreError> {
    match row.get(column) {
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(StoreError::decode(
            format!("column '{column}'"),
            format!("expected an object, got {other}"),
        )),
        None => Err(StoreError::decode("row", format!("missing column '{column}'"))),
    }
}

fn encode_fields(mut record: Record) -> Result<Record, StoreError> {
    for field in JSON_ENCODED_FIELDS {
        if let Some(value) = record.get_mut(*field) {
            *value = Value::String(serde_json::to_string(value)?);
        }
    }
    Ok(record)
}

fn decode_fields(mut record: Record) -> Result<Record, StoreError> {
    for field in JSON_ENCODED_FIELDS {
        if let Some(Value::String(encoded)) = record.get(*field) {
            let decoded: Value = serde_json::from_str(encoded)
                .map_err(|e| StoreError::decode(format!("field '{field}'"), e))?;
            record.insert(field.to_string(), decoded);
        }
    }
    Ok(record)
}
