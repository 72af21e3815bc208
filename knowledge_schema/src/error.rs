//! Validation errors raised while constructing entities.

use thiserror::Error;

/// A malformed entity field.
///
/// Every variant names the offending field so callers (and batch reports)
/// can point at the exact problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is absent, null, or blank.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A field holds a value outside its recognized set or of the wrong shape.
    #[error("invalid value for '{field}': '{value}'")]
    InvalidValue { field: String, value: String },

    /// A numeric field lies outside its valid range.
    #[error("value for '{field}' out of range: {value}")]
    OutOfRange { field: String, value: String },

    /// An attempt to change a field that is fixed after creation.
    #[error("field '{field}' cannot be changed after creation")]
    ImmutableField { field: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, value: impl ToString) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Name of the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::ImmutableField { field } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_field() {
        let err = ValidationError::invalid("node_type", "spaceship");
        assert_eq!(err.to_string(), "invalid value for 'node_type': 'spaceship'");
        assert_eq!(err.field(), "node_type");

        let err = ValidationError::missing("id");
        assert_eq!(err.to_string(), "missing required field 'id'");
    }

    #[test]
    fn test_out_of_range_formats_value() {
        let err = ValidationError::out_of_range("weight", 1.5);
        assert_eq!(err.to_string(), "value for 'weight' out of range: 1.5");
    }
}
