//! Filtered export of a graph as a bulk payload.

use chrono::Utc;
use knowledge_schema::{DifficultyLevel, KnowledgeNode, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::info;

use crate::knowledge_base::KnowledgeGraph;

/// Node criteria for an export. Unset fields match everything; set fields
/// must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<DifficultyLevel>,
}

impl ExportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_difficulty(mut self, level: DifficultyLevel) -> Self {
        self.difficulty_level = Some(level);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, node: &KnowledgeNode) -> bool {
        self.node_type.map_or(true, |t| node.node_type() == t)
            && self
                .language
                .as_ref()
                .map_or(true, |l| node.language.as_ref() == Some(l))
            && self
                .category
                .as_ref()
                .map_or(true, |c| node.category.as_ref() == Some(c))
            && self
                .difficulty_level
                .map_or(true, |d| node.difficulty_level == Some(d))
    }
}

/// Export the nodes matching `filter`, sorted by name, and the relationships
/// whose endpoints were both exported.
pub fn export_payload(graph: &KnowledgeGraph, filter: &ExportFilter) -> Value {
    let mut nodes: Vec<&KnowledgeNode> = graph.find_nodes(|node| filter.matches(node));
    nodes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let relationships: Vec<Value> = graph
        .relationships()
        .filter(|r| kept.contains(r.source_id.as_str()) && kept.contains(r.target_id.as_str()))
        .map(|r| Value::Object(r.to_record()))
        .collect();
    let nodes: Vec<Value> = nodes.iter().map(|n| Value::Object(n.to_record())).collect();

    info!(
        nodes = nodes.len(),
        relationships = relationships.len(),
        "exported graph"
    );

    json!({
        "metadata": {
            "name": graph.metadata.name,
            "version": graph.metadata.version,
            "export_date": Utc::now().to_rfc3339(),
            "total_nodes": nodes.len(),
            "total_relationships": relationships.len(),
            "filters": filter,
        },
        "nodes": nodes,
        "relationships": relationships,
    })
}
