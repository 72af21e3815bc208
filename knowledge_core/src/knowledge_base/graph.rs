//! Knowledge Graph - the in-memory container of nodes and relationships.

use knowledge_schema::{
    KnowledgeNode, KnowledgeRelationship, NodeType, NodeUpdate, RelationshipType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::{Endpoint, GraphError};

/// Descriptive information about a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Knowledge domain, e.g. "C++ programming".
    pub domain: Option<String>,
    pub version: String,
    /// Primary programming language covered.
    pub language: Option<String>,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            id: "knowledge-graph".to_string(),
            name: "Knowledge Graph".to_string(),
            description: String::new(),
            domain: None,
            version: "1.0.0".to_string(),
            language: None,
        }
    }
}

/// The graph container.
///
/// Owns every node and relationship. Relationships always connect two nodes
/// that are present; removing a node removes the relationships touching it.
/// Maps are ordered by id, so every scan and traversal is deterministic.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    pub metadata: GraphMetadata,

    nodes: BTreeMap<String, KnowledgeNode>,
    relationships: BTreeMap<String, KnowledgeRelationship>,

    // Maintained on every mutation; always equal to the map sizes.
    node_count: usize,
    relationship_count: usize,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given metadata.
    pub fn with_metadata(metadata: GraphMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Add a node. Fails if a node with the same id exists.
    pub fn add_node(&mut self, node: KnowledgeNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::duplicate_node(&node.id));
        }

        debug!(node_id = %node.id, node_type = %node.node_type(), "adding node");
        self.nodes.insert(node.id.clone(), node);
        self.node_count += 1;
        Ok(())
    }

    /// Remove a node and every relationship touching it.
    ///
    /// Returns `false` if the node does not exist.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if self.nodes.remove(id).is_none() {
            return false;
        }
        self.node_count -= 1;

        let touching: Vec<String> = self
            .relationships
            .values()
            .filter(|rel| rel.touches(id))
            .map(|rel| rel.id.clone())
            .collect();

        for rel_id in &touching {
            self.remove_relationship(rel_id);
        }

        debug!(node_id = id, cascaded = touching.len(), "removed node");
        true
    }

    /// Add a relationship between two existing nodes.
    ///
    /// Endpoints are checked before the id, so a relationship to a missing
    /// node always fails with [`GraphError::DanglingEndpoint`].
    pub fn add_relationship(&mut self, relationship: KnowledgeRelationship) -> Result<(), GraphError> {
        for (endpoint, node_id) in [
            (Endpoint::Source, &relationship.source_id),
            (Endpoint::Target, &relationship.target_id),
        ] {
            if !self.nodes.contains_key(node_id) {
                return Err(GraphError::DanglingEndpoint {
                    relationship_id: relationship.id.clone(),
                    endpoint,
                    node_id: node_id.clone(),
                });
            }
        }
        if self.relationships.contains_key(&relationship.id) {
            return Err(GraphError::duplicate_relationship(&relationship.id));
        }

        debug!(
            relationship_id = %relationship.id,
            source = %relationship.source_id,
            target = %relationship.target_id,
            relationship_type = %relationship.relationship_type(),
            "adding relationship"
        );
        self.relationships.insert(relationship.id.clone(), relationship);
        self.relationship_count += 1;
        Ok(())
    }

    /// Remove a relationship. Returns `false` if it does not exist.
    pub fn remove_relationship(&mut self, id: &str) -> bool {
        if self.relationships.remove(id).is_some() {
            self.relationship_count -= 1;
            true
        } else {
            false
        }
    }

    /// Apply a partial update to a node in place.
    ///
    /// Returns `Ok(false)` if the node does not exist.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> Result<bool, GraphError> {
        update.validate()?;

        match self.nodes.get_mut(id) {
            Some(node) => {
                node.apply(update)?;
                debug!(node_id = id, "updated node");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get node by ID.
    pub fn get_node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.nodes.get(id)
    }

    /// Get relationship by ID.
    pub fn get_relationship(&self, id: &str) -> Option<&KnowledgeRelationship> {
        self.relationships.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_relationship(&self, id: &str) -> bool {
        self.relationships.contains_key(id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &KnowledgeNode> {
        self.nodes.values()
    }

    /// All relationships, ordered by id.
    pub fn relationships(&self) -> impl Iterator<Item = &KnowledgeRelationship> {
        self.relationships.values()
    }

    /// All node ids, ordered.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn relationship_count(&self) -> usize {
        self.relationship_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes_by_type(&self, node_type: NodeType) -> Vec<&KnowledgeNode> {
        self.find_nodes(|n| n.node_type() == node_type)
    }

    pub fn nodes_by_language(&self, language: &str) -> Vec<&KnowledgeNode> {
        self.find_nodes(|n| n.language.as_deref() == Some(language))
    }

    pub fn relationships_by_type(&self, relationship_type: RelationshipType) -> Vec<&KnowledgeRelationship> {
        self.relationships
            .values()
            .filter(|r| r.relationship_type() == relationship_type)
            .collect()
    }

    /// Find nodes matching a predicate.
    pub fn find_nodes<F>(&self, predicate: F) -> Vec<&KnowledgeNode>
    where
        F: Fn(&KnowledgeNode) -> bool,
    {
        self.nodes.values().filter(|n| predicate(n)).collect()
    }

    /// Relationships whose source is `node_id`.
    pub fn outgoing_relationships(&self, node_id: &str) -> Vec<&KnowledgeRelationship> {
        self.relationships
            .values()
            .filter(|r| r.source_id == node_id)
            .collect()
    }

    /// Relationships whose target is `node_id`.
    pub fn incoming_relationships(&self, node_id: &str) -> Vec<&KnowledgeRelationship> {
        self.relationships
            .values()
            .filter(|r| r.target_id == node_id)
            .collect()
    }
}
