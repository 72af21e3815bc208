//! Knowledge nodes - the typed entities of the graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::NodeDetails;
use crate::record::{put_list, put_opt, Record, RecordReader};
use crate::{DifficultyLevel, Kind, NodeType, ValidationError};

/// A node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    /// Globally unique and immutable once created.
    pub id: String,
    pub name: String,
    /// Fixed at creation; the details variant depends on it.
    node_type: NodeType,
    pub description: String,

    pub difficulty_level: Option<DifficultyLevel>,
    /// Ids of nodes this one builds on. Not checked against any graph.
    pub prerequisites: Vec<String>,
    /// Estimated learning time in minutes.
    pub learning_time: Option<u32>,

    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tags: BTreeSet<String>,

    /// Programming language this node is about (free text, e.g. "cpp").
    pub language: Option<String>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pub created_by: Option<String>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    // Display hints
    pub color: Option<String>,
    pub size: Option<u32>,
    pub icon: Option<String>,

    #[serde(default)]
    details: NodeDetails,
}

impl KnowledgeNode {
    /// Create a node, picking the details variant for its type.
    ///
    /// Fails if `id` or `name` is blank.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: NodeType,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(ValidationError::missing("id"));
        }
        if name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            node_type,
            description: description.into(),
            difficulty_level: None,
            prerequisites: Vec::new(),
            learning_time: None,
            category: None,
            subcategory: None,
            tags: BTreeSet::new(),
            language: None,
            created_at: now,
            updated_at: now,
            created_by: None,
            properties: Map::new(),
            color: None,
            size: None,
            icon: None,
            details: NodeDetails::for_type(node_type),
        })
    }

    pub fn with_difficulty(mut self, level: DifficultyLevel) -> Self {
        self.difficulty_level = Some(level);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Append a prerequisite id. Order is preserved.
    pub fn with_prerequisite(mut self, node_id: impl Into<String>) -> Self {
        self.prerequisites.push(node_id.into());
        self
    }

    pub fn with_learning_time(mut self, minutes: u32) -> Self {
        self.learning_time = Some(minutes);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace the specialized details. They must belong to this node's type.
    pub fn with_details(mut self, details: NodeDetails) -> Result<Self, ValidationError> {
        if !details.matches(self.node_type) {
            return Err(ValidationError::invalid("details", format!("{details:?}")));
        }
        self.details = details;
        Ok(self)
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn details(&self) -> &NodeDetails {
        &self.details
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Mark the node as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Apply a partial update in place. A blank name leaves the node untouched.
    pub fn apply(&mut self, update: NodeUpdate) -> Result<(), ValidationError> {
        update.validate()?;
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(subcategory) = update.subcategory {
            self.subcategory = Some(subcategory);
        }
        if let Some(level) = update.difficulty_level {
            self.difficulty_level = Some(level);
        }
        if let Some(language) = update.language {
            self.language = Some(language);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(prerequisites) = update.prerequisites {
            self.prerequisites = prerequisites;
        }
        if let Some(properties) = update.properties {
            self.properties = properties;
        }
        if let Some(minutes) = update.learning_time {
            self.learning_time = Some(minutes);
        }
        self.touch();
        Ok(())
    }

    /// Check the invariants that construction guarantees.
    ///
    /// Deserialized nodes bypass the constructors, so callers restoring
    /// nodes from serialized form run this before trusting them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::missing("id"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        if !self.details.matches(self.node_type) {
            return Err(ValidationError::invalid("details", format!("{:?}", self.details)));
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::invalid("updated_at", self.updated_at.to_rfc3339()));
        }
        Ok(())
    }

    /// Build a node from a flat JSON record (bulk payload element or store row).
    pub fn from_record(value: &Value) -> Result<Self, ValidationError> {
        let reader = RecordReader::from_value(value)?;

        let id = reader.required_str("id")?;
        let name = reader.required_str("name")?;
        let node_type: NodeType = reader.required_kind()?;
        let description = reader
            .optional_str("description")?
            .ok_or_else(|| ValidationError::missing("description"))?;

        let mut node = Self::new(id, name, node_type, description)?;
        node.difficulty_level = reader.optional_kind()?;
        node.prerequisites = reader.string_list("prerequisites")?;
        node.learning_time = reader.optional_u32("learning_time")?;
        node.category = reader.optional_str("category")?;
        node.subcategory = reader.optional_str("subcategory")?;
        node.tags = reader.string_list("tags")?.into_iter().collect();
        node.language = reader.optional_str("language")?;
        node.created_by = reader.optional_str("created_by")?;
        node.properties = reader.object("properties")?;
        node.color = reader.optional_str("color")?;
        node.size = reader.optional_u32("size")?;
        node.icon = reader.optional_str("icon")?;
        node.details = NodeDetails::from_record(node_type, &reader)?;

        if let Some(created_at) = reader.optional_timestamp("created_at")? {
            node.created_at = created_at;
            node.updated_at = created_at;
        }
        if let Some(updated_at) = reader.optional_timestamp("updated_at")? {
            if updated_at < node.created_at {
                return Err(ValidationError::invalid("updated_at", updated_at.to_rfc3339()));
            }
            node.updated_at = updated_at;
        }

        Ok(node)
    }

    /// Render the node as a flat JSON record.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), self.id.clone().into());
        record.insert("name".to_string(), self.name.clone().into());
        record.insert("node_type".to_string(), self.node_type.as_str().into());
        record.insert("description".to_string(), self.description.clone().into());
        put_opt(&mut record, "difficulty_level", self.difficulty_level.map(|d| d.as_str()));
        put_list(&mut record, "prerequisites", &self.prerequisites);
        put_opt(&mut record, "learning_time", self.learning_time);
        put_opt(&mut record, "category", self.category.clone());
        put_opt(&mut record, "subcategory", self.subcategory.clone());
        let tags: Vec<String> = self.tags.iter().cloned().collect();
        put_list(&mut record, "tags", &tags);
        put_opt(&mut record, "language", self.language.clone());
        record.insert("created_at".to_string(), self.created_at.to_rfc3339().into());
        record.insert("updated_at".to_string(), self.updated_at.to_rfc3339().into());
        put_opt(&mut record, "created_by", self.created_by.clone());
        if !self.properties.is_empty() {
            record.insert("properties".to_string(), Value::Object(self.properties.clone()));
        }
        put_opt(&mut record, "color", self.color.clone());
        put_opt(&mut record, "size", self.size);
        put_opt(&mut record, "icon", self.icon.clone());
        self.details.write_record(&mut record);
        record
    }
}

/// Factory: create a node of the given type with its specialized details.
pub fn create_node(
    node_type: NodeType,
    id: impl Into<String>,
    name: impl Into<String>,
    description: impl Into<String>,
) -> Result<KnowledgeNode, ValidationError> {
    KnowledgeNode::new(id, name, node_type, description)
}

/// A partial update to a node. `None` leaves a field untouched.
///
/// `id` and `node_type` cannot be updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub language: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub prerequisites: Option<Vec<String>>,
    pub properties: Option<Map<String, Value>>,
    pub learning_time: Option<u32>,
}

impl NodeUpdate {
    /// Parse an update from a JSON object, rejecting immutable or unknown fields.
    pub fn from_record(value: &Value) -> Result<Self, ValidationError> {
        let reader = RecordReader::from_value(value)?;
        if let Some(map) = value.as_object() {
            for key in map.keys() {
                match key.as_str() {
                    "id" | "node_type" | "created_at" => {
                        return Err(ValidationError::ImmutableField { field: key.clone() })
                    }
                    "name" | "description" | "category" | "subcategory" | "difficulty_level"
                    | "language" | "tags" | "prerequisites" | "properties" | "learning_time" => {}
                    other => return Err(ValidationError::invalid("update", other)),
                }
            }
        }

        let update = Self {
            name: reader.optional_str("name")?,
            description: reader.optional_str("description")?,
            category: reader.optional_str("category")?,
            subcategory: reader.optional_str("subcategory")?,
            difficulty_level: reader.optional_kind()?,
            language: reader.optional_str("language")?,
            tags: reader
                .has("tags")
                .then(|| reader.string_list("tags"))
                .transpose()?
                .map(|tags| tags.into_iter().collect()),
            prerequisites: reader
                .has("prerequisites")
                .then(|| reader.string_list("prerequisites"))
                .transpose()?,
            properties: reader
                .has("properties")
                .then(|| reader.object("properties"))
                .transpose()?,
            learning_time: reader.optional_u32("learning_time")?,
        };

        update.validate()?;
        Ok(update)
    }

    /// Reject a blank replacement name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(ValidationError::missing("name")),
            _ => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render only the fields that are set.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        put_opt(&mut record, "name", self.name.clone());
        put_opt(&mut record, "description", self.description.clone());
        put_opt(&mut record, "category", self.category.clone());
        put_opt(&mut record, "subcategory", self.subcategory.clone());
        put_opt(&mut record, "difficulty_level", self.difficulty_level.map(|d| d.as_str()));
        put_opt(&mut record, "language", self.language.clone());
        if let Some(tags) = &self.tags {
            record.insert("tags".to_string(), Value::from(tags.iter().cloned().collect::<Vec<_>>()));
        }
        if let Some(prerequisites) = &self.prerequisites {
            record.insert("prerequisites".to_string(), Value::from(prerequisites.clone()));
        }
        if let Some(properties) = &self.properties {
            record.insert("properties".to_string(), Value::Object(properties.clone()));
        }
        put_opt(&mut record, "learning_time", self.learning_time);
        record
    }
}
