//! Best-effort bulk import.

use knowledge_schema::{KnowledgeNode, KnowledgeRelationship};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

use crate::knowledge_base::{GraphError, GraphMetadata, KnowledgeGraph};
use crate::store::{GraphStore, KnowledgeRepository};

/// One payload element that could not be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    /// Element path, e.g. `nodes[3]`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub nodes_imported: usize,
    pub relationships_imported: usize,
    /// Node elements in the payload.
    pub total_nodes: usize,
    /// Relationship elements in the payload.
    pub total_relationships: usize,
    pub errors: Vec<ImportIssue>,
}

impl ImportSummary {
    pub fn success_count(&self) -> usize {
        self.nodes_imported + self.relationships_imported
    }

    pub fn total_count(&self) -> usize {
        self.total_nodes + self.total_relationships
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, path: String, message: impl ToString) {
        warn!(%path, "import element failed");
        self.errors.push(ImportIssue {
            path,
            message: message.to_string(),
        });
    }
}

/// Where imported entities go.
trait ImportSink {
    fn import_node(&mut self, node: KnowledgeNode) -> Result<(), GraphError>;
    fn import_relationship(&mut self, rel: KnowledgeRelationship) -> Result<(), GraphError>;
}

impl ImportSink for KnowledgeGraph {
    fn import_node(&mut self, node: KnowledgeNode) -> Result<(), GraphError> {
        self.add_node(node)
    }

    fn import_relationship(&mut self, rel: KnowledgeRelationship) -> Result<(), GraphError> {
        self.add_relationship(rel)
    }
}

impl<S: GraphStore> ImportSink for &KnowledgeRepository<S> {
    fn import_node(&mut self, node: KnowledgeNode) -> Result<(), GraphError> {
        self.create_node(&node)
    }

    fn import_relationship(&mut self, rel: KnowledgeRelationship) -> Result<(), GraphError> {
        self.create_relationship(&rel)
    }
}

/// Import a payload into an in-memory graph: nodes first, then relationships.
///
/// Failures are recorded per element and never abort the import. String
/// fields of the payload's `metadata` replace the graph's metadata.
pub fn import_into_graph(graph: &mut KnowledgeGraph, payload: &Value) -> ImportSummary {
    if let Some(metadata) = payload.get("metadata") {
        apply_metadata(&mut graph.metadata, metadata);
    }
    import_with(graph, payload)
}

/// Import a payload through a store repository, with the same accounting.
pub fn import_into_store<S: GraphStore>(
    repository: &KnowledgeRepository<S>,
    payload: &Value,
) -> ImportSummary {
    let mut sink = repository;
    import_with(&mut sink, payload)
}

fn import_with<T: ImportSink>(sink: &mut T, payload: &Value) -> ImportSummary {
    let mut summary = ImportSummary::default();

    let nodes = elements(&mut summary, payload, "nodes");
    summary.total_nodes = nodes.len();
    for (i, element) in nodes.iter().enumerate() {
        let result = KnowledgeNode::from_record(element)
            .map_err(GraphError::from)
            .and_then(|node| sink.import_node(node));
        match result {
            Ok(()) => summary.nodes_imported += 1,
            Err(err) => summary.record(format!("nodes[{i}]"), err),
        }
    }

    let relationships = elements(&mut summary, payload, "relationships");
    summary.total_relationships = relationships.len();
    for (i, element) in relationships.iter().enumerate() {
        let result = KnowledgeRelationship::from_record(element)
            .map_err(GraphError::from)
            .and_then(|rel| sink.import_relationship(rel));
        match result {
            Ok(()) => summary.relationships_imported += 1,
            Err(err) => summary.record(format!("relationships[{i}]"), err),
        }
    }

    info!(
        nodes = summary.nodes_imported,
        relationships = summary.relationships_imported,
        errors = summary.errors.len(),
        "import finished"
    );
    summary
}

/// The array under `section`; anything other than an array or absence is recorded.
fn elements<'a>(summary: &mut ImportSummary, payload: &'a Value, section: &str) -> &'a [Value] {
    match payload.get(section) {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            summary.record(section.to_string(), "expected an array");
            &[]
        }
    }
}

fn apply_metadata(metadata: &mut GraphMetadata, source: &Value) {
    let text = |field: &str| source.get(field).and_then(Value::as_str).map(str::to_string);

    if let Some(id) = text("id") {
        metadata.id = id;
    }
    if let Some(name) = text("name") {
        metadata.name = name;
    }
    if let Some(description) = text("description") {
        metadata.description = description;
    }
    if let Some(version) = text("version") {
        metadata.version = version;
    }
    if let Some(domain) = text("domain") {
        metadata.domain = Some(domain);
    }
    if let Some(language) = text("language") {
        metadata.language = Some(language);
    }
}
