//! Knowledge relationships - typed, weighted edges between nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::RelationshipDetails;
use crate::record::{put_list, put_opt, Record, RecordReader};
use crate::{Kind, RelationshipStrength, RelationshipType, ValidationError};

/// Weight given to relationships that don't specify one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A directed (optionally bidirectional) edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRelationship {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    relationship_type: RelationshipType,

    pub strength: Option<RelationshipStrength>,
    /// Always within 0.0 to 1.0.
    weight: f64,
    /// When set, traversal may also walk from target to source.
    pub bidirectional: bool,

    pub description: Option<String>,
    pub examples: Vec<String>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pub created_by: Option<String>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    // Display hints
    pub color: Option<String>,
    pub style: Option<String>,
    pub label: Option<String>,

    #[serde(default)]
    details: RelationshipDetails,
}

impl KnowledgeRelationship {
    /// Create a relationship, picking the details variant for its type.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let source_id = source_id.into();
        let target_id = target_id.into();
        for (field, value) in [("id", &id), ("source_id", &source_id), ("target_id", &target_id)] {
            if value.trim().is_empty() {
                return Err(ValidationError::missing(field));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id,
            source_id,
            target_id,
            relationship_type,
            strength: Some(RelationshipStrength::default()),
            weight: DEFAULT_WEIGHT,
            bidirectional: false,
            description: None,
            examples: Vec::new(),
            created_at: now,
            updated_at: now,
            created_by: None,
            properties: Map::new(),
            color: None,
            style: None,
            label: None,
            details: RelationshipDetails::for_type(relationship_type),
        })
    }

    /// Create a relationship with a freshly generated id.
    pub fn connect(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Result<Self, ValidationError> {
        Self::new(Uuid::new_v4().to_string(), source_id, target_id, relationship_type)
    }

    pub fn with_strength(mut self, strength: RelationshipStrength) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Set the weight, clamped to 0.0..=1.0. Non-finite weights are rejected.
    pub fn with_weight(mut self, weight: f64) -> Result<Self, ValidationError> {
        if !weight.is_finite() {
            return Err(ValidationError::out_of_range("weight", weight));
        }
        self.weight = weight.clamp(0.0, 1.0);
        Ok(self)
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace the specialized details. They must belong to this relationship's type.
    pub fn with_details(mut self, details: RelationshipDetails) -> Result<Self, ValidationError> {
        if !details.matches(self.relationship_type) {
            return Err(ValidationError::invalid("details", format!("{details:?}")));
        }
        self.details = details;
        Ok(self)
    }

    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship_type
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn details(&self) -> &RelationshipDetails {
        &self.details
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the relationship has `node_id` as either endpoint.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// The node reached by walking this relationship from `node_id`, if the
    /// walk is allowed by its direction.
    pub fn neighbor_of(&self, node_id: &str) -> Option<&str> {
        if self.source_id == node_id {
            Some(&self.target_id)
        } else if self.bidirectional && self.target_id == node_id {
            Some(&self.source_id)
        } else {
            None
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Check the invariants that construction guarantees. Deserialized
    /// relationships skip the constructors and must pass this first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("id", &self.id),
            ("source_id", &self.source_id),
            ("target_id", &self.target_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::missing(field));
            }
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(ValidationError::out_of_range("weight", self.weight));
        }
        if !self.details.matches(self.relationship_type) {
            return Err(ValidationError::invalid("details", format!("{:?}", self.details)));
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::invalid("updated_at", self.updated_at.to_rfc3339()));
        }
        Ok(())
    }

    /// Build a relationship from a flat JSON record.
    ///
    /// Unlike [`with_weight`](Self::with_weight), an out-of-range weight in a
    /// record is an error rather than clamped.
    pub fn from_record(value: &Value) -> Result<Self, ValidationError> {
        let reader = RecordReader::from_value(value)?;

        let id = reader.required_str("id")?;
        let source_id = reader.required_str("source_id")?;
        let target_id = reader.required_str("target_id")?;
        let relationship_type: RelationshipType = reader.required_kind()?;

        let mut rel = Self::new(id, source_id, target_id, relationship_type)?;
        if let Some(strength) = reader.optional_kind()? {
            rel.strength = Some(strength);
        }
        if let Some(weight) = reader.optional_f64("weight")? {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ValidationError::out_of_range("weight", weight));
            }
            rel.weight = weight;
        }
        rel.bidirectional = reader.bool_or("bidirectional", false)?;
        rel.description = reader.optional_str("description")?;
        rel.examples = reader.string_list("examples")?;
        rel.created_by = reader.optional_str("created_by")?;
        rel.properties = reader.object("properties")?;
        rel.color = reader.optional_str("color")?;
        rel.style = reader.optional_str("style")?;
        rel.label = reader.optional_str("label")?;
        rel.details = RelationshipDetails::from_record(relationship_type, &reader)?;

        if let Some(created_at) = reader.optional_timestamp("created_at")? {
            rel.created_at = created_at;
            rel.updated_at = created_at;
        }
        if let Some(updated_at) = reader.optional_timestamp("updated_at")? {
            if updated_at < rel.created_at {
                return Err(ValidationError::invalid("updated_at", updated_at.to_rfc3339()));
            }
            rel.updated_at = updated_at;
        }

        Ok(rel)
    }

    /// Render the relationship as a flat JSON record.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), self.id.clone().into());
        record.insert("source_id".to_string(), self.source_id.clone().into());
        record.insert("target_id".to_string(), self.target_id.clone().into());
        record.insert(
            "relationship_type".to_string(),
            self.relationship_type.as_str().into(),
        );
        put_opt(&mut record, "strength", self.strength.map(|s| s.as_str()));
        record.insert("weight".to_string(), self.weight.into());
        record.insert("bidirectional".to_string(), self.bidirectional.into());
        put_opt(&mut record, "description", self.description.clone());
        put_list(&mut record, "examples", &self.examples);
        record.insert("created_at".to_string(), self.created_at.to_rfc3339().into());
        record.insert("updated_at".to_string(), self.updated_at.to_rfc3339().into());
        put_opt(&mut record, "created_by", self.created_by.clone());
        if !self.properties.is_empty() {
            record.insert("properties".to_string(), Value::Object(self.properties.clone()));
        }
        put_opt(&mut record, "color", self.color.clone());
        put_opt(&mut record, "style", self.style.clone());
        put_opt(&mut record, "label", self.label.clone());
        self.details.write_record(&mut record);
        record
    }
}

/// Factory: create a relationship of the given type with its specialized details.
pub fn create_relationship(
    relationship_type: RelationshipType,
    id: impl Into<String>,
    source_id: impl Into<String>,
    target_id: impl Into<String>,
) -> Result<KnowledgeRelationship, ValidationError> {
    KnowledgeRelationship::new(id, source_id, target_id, relationship_type)
}
