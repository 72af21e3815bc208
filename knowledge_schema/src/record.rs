//! Field access over loosely typed JSON records (bulk payload elements, store rows).

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{Kind, ValidationError};

/// A JSON object as it appears in a bulk payload or a store row.
pub type Record = Map<String, Value>;

/// Typed, validating reads over a [`Record`].
///
/// `null` is treated the same as an absent field.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a> {
    record: &'a Record,
}

impl<'a> RecordReader<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self { record }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: &'a Value) -> Result<Self, ValidationError> {
        value
            .as_object()
            .map(Self::new)
            .ok_or_else(|| ValidationError::invalid("record", describe(value)))
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.record.get(field).filter(|v| !v.is_null())
    }

    /// Whether the field is present and non-null.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// A required, non-blank string.
    pub fn required_str(&self, field: &str) -> Result<String, ValidationError> {
        match self.optional_str(field)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(ValidationError::missing(field)),
        }
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<String>, ValidationError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ValidationError::invalid(field, describe(other))),
        }
    }

    /// An array of strings; absent means empty.
    pub fn string_list(&self, field: &str) -> Result<Vec<String>, ValidationError> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(ValidationError::invalid(field, describe(other))),
                })
                .collect(),
            Some(other) => Err(ValidationError::invalid(field, describe(other))),
        }
    }

    pub fn optional_u32(&self, field: &str) -> Result<Option<u32>, ValidationError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(field, describe(value))),
        }
    }

    pub fn optional_i64(&self, field: &str) -> Result<Option<i64>, ValidationError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(field, describe(value))),
        }
    }

    pub fn optional_f64(&self, field: &str) -> Result<Option<f64>, ValidationError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(field, describe(value))),
        }
    }

    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool, ValidationError> {
        match self.get(field) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(ValidationError::invalid(field, describe(other))),
        }
    }

    /// A nested object; absent means empty.
    pub fn object(&self, field: &str) -> Result<Record, ValidationError> {
        match self.get(field) {
            None => Ok(Record::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(ValidationError::invalid(field, describe(other))),
        }
    }

    pub fn optional_kind<K: Kind>(&self) -> Result<Option<K>, ValidationError> {
        self.optional_str(K::FIELD)?
            .map(|s| K::parse(&s))
            .transpose()
    }

    pub fn required_kind<K: Kind>(&self) -> Result<K, ValidationError> {
        self.optional_kind()?
            .ok_or_else(|| ValidationError::missing(K::FIELD))
    }

    /// An RFC 3339 timestamp.
    pub fn optional_timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
        self.optional_str(field)?
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| ValidationError::invalid(field, s))
            })
            .transpose()
    }
}

/// Short rendering of a JSON value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Insert `value` under `field` unless it is `None`.
pub(crate) fn put_opt<T: Into<Value>>(record: &mut Record, field: &str, value: Option<T>) {
    if let Some(value) = value {
        record.insert(field.to_string(), value.into());
    }
}

/// Insert a string list under `field` unless it is empty.
pub(crate) fn put_list(record: &mut Record, field: &str, values: &[String]) {
    if !values.is_empty() {
        record.insert(field.to_string(), Value::from(values.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeType;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str_rejects_blank_and_null() {
        let rec = record(json!({"id": "  ", "name": null}));
        let reader = RecordReader::new(&rec);

        assert_eq!(reader.required_str("id"), Err(ValidationError::missing("id")));
        assert_eq!(reader.required_str("name"), Err(ValidationError::missing("name")));
        assert_eq!(reader.required_str("other"), Err(ValidationError::missing("other")));
    }

    #[test]
    fn test_wrong_shape_is_invalid() {
        let rec = record(json!({"tags": "rust", "learning_time": -5, "bidirectional": "yes"}));
        let reader = RecordReader::new(&rec);

        assert!(matches!(
            reader.string_list("tags"),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(reader.optional_u32("learning_time").is_err());
        assert!(reader.bool_or("bidirectional", false).is_err());
    }

    #[test]
    fn test_kind_parsing() {
        let rec = record(json!({"node_type": "pattern"}));
        let reader = RecordReader::new(&rec);
        assert_eq!(reader.required_kind::<NodeType>().unwrap(), NodeType::Pattern);

        let rec = record(json!({"node_type": "widget"}));
        let reader = RecordReader::new(&rec);
        assert_eq!(
            reader.required_kind::<NodeType>(),
            Err(ValidationError::invalid("node_type", "widget"))
        );
    }

    #[test]
    fn test_timestamp_parsing() {
        let rec = record(json!({"created_at": "2024-03-01T12:00:00Z", "updated_at": "yesterday"}));
        let reader = RecordReader::new(&rec);

        assert!(reader.optional_timestamp("created_at").unwrap().is_some());
        assert!(reader.optional_timestamp("updated_at").is_err());
        assert!(reader.optional_timestamp("missing").unwrap().is_none());
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(RecordReader::from_value(&json!([1, 2])).is_err());
        assert!(RecordReader::from_value(&json!({})).is_ok());
    }
}
