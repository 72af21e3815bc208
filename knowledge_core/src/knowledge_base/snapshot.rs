//! Whole-graph snapshots for serialization.

use knowledge_schema::{KnowledgeNode, KnowledgeRelationship, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{GraphError, GraphMetadata, KnowledgeGraph};
use crate::stats::GraphStatistics;

/// A serializable copy of a graph, with statistics taken at export time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub metadata: GraphMetadata,
    pub nodes: BTreeMap<String, KnowledgeNode>,
    pub relationships: BTreeMap<String, KnowledgeRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<GraphStatistics>,
}

impl KnowledgeGraph {
    /// Copy the whole graph into a snapshot.
    pub fn export_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            metadata: self.metadata.clone(),
            nodes: self.nodes().map(|n| (n.id.clone(), n.clone())).collect(),
            relationships: self
                .relationships()
                .map(|r| (r.id.clone(), r.clone()))
                .collect(),
            statistics: Some(GraphStatistics::compute(self)),
        }
    }

    /// Rebuild a graph from a snapshot.
    ///
    /// Every entity is validated and then goes through the normal add path,
    /// so out-of-range weights, mismatched details, inverted timestamps, map
    /// keys that disagree with entity ids and dangling relationships are all
    /// rejected. Embedded statistics are ignored.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = KnowledgeGraph::with_metadata(snapshot.metadata);

        for (key, node) in snapshot.nodes {
            if key != node.id {
                return Err(ValidationError::invalid("id", key).into());
            }
            node.validate()?;
            graph.add_node(node)?;
        }
        for (key, relationship) in snapshot.relationships {
            if key != relationship.id {
                return Err(ValidationError::invalid("id", key).into());
            }
            relationship.validate()?;
            graph.add_relationship(relationship)?;
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge_schema::{ConceptDetails, NodeDetails, NodeType, RelationshipType};

    fn sample() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.metadata.name = "C++ basics".to_string();
        graph
            .add_node(KnowledgeNode::new("cpp", "C++", NodeType::Language, "").unwrap())
            .unwrap();
        graph
            .add_node(KnowledgeNode::new("raii", "RAII", NodeType::Pattern, "").unwrap())
            .unwrap();
        graph
            .add_relationship(
                KnowledgeRelationship::new("r1", "raii", "cpp", RelationshipType::BelongsTo).unwrap(),
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_snapshot_restores_graph() {
        let graph = sample();
        let snapshot = graph.export_snapshot();
        assert_eq!(snapshot.statistics.as_ref().unwrap().total_nodes, 2);

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: GraphSnapshot = serde_json::from_str(&json).unwrap();
        let restored = KnowledgeGraph::from_snapshot(parsed).unwrap();

        assert_eq!(restored.metadata.name, "C++ basics");
        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.relationship_count(), 1);
        assert_eq!(restored.get_node("cpp"), graph.get_node("cpp"));
    }

    #[test]
    fn test_snapshot_with_dangling_relationship_rejected() {
        let mut snapshot = sample().export_snapshot();
        snapshot.nodes.remove("cpp");

        let err = KnowledgeGraph::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEndpoint { .. }));
    }

    #[test]
    fn test_snapshot_key_mismatch_rejected() {
        let mut snapshot = sample().export_snapshot();
        let node = snapshot.nodes.remove("cpp").unwrap();
        snapshot.nodes.insert("c++".to_string(), node);

        assert!(matches!(
            KnowledgeGraph::from_snapshot(snapshot),
            Err(GraphError::Validation(_))
        ));
    }

    fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> Result<KnowledgeGraph, GraphError> {
        let mut value = serde_json::to_value(sample().export_snapshot()).unwrap();
        edit(&mut value);
        let snapshot: GraphSnapshot = serde_json::from_value(value).unwrap();
        KnowledgeGraph::from_snapshot(snapshot)
    }

    #[test]
    fn test_snapshot_rejects_invalid_entities() {
        let field = |result: Result<KnowledgeGraph, GraphError>| match result {
            Err(GraphError::Validation(err)) => err.field().to_string(),
            other => panic!("expected a validation error, got {other:?}"),
        };

        let weight = tampered(|v| v["relationships"]["r1"]["weight"] = serde_json::json!(7.5));
        assert_eq!(field(weight), "weight");

        let timestamps =
            tampered(|v| v["nodes"]["raii"]["created_at"] = serde_json::json!("2030-01-01T00:00:00Z"));
        assert_eq!(field(timestamps), "updated_at");

        let details = tampered(|v| {
            let concept = NodeDetails::Concept(ConceptDetails::default());
            v["nodes"]["raii"]["details"] = serde_json::to_value(concept).unwrap();
        });
        assert_eq!(field(details), "details");

        assert!(tampered(|_| {}).is_ok());
    }
}
