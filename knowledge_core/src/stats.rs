//! Graph statistics, always computed from live state.

use knowledge_schema::{Kind, NodeType, RelationshipType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::knowledge_base::KnowledgeGraph;

/// Aggregate counts and distributions over a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_relationships: usize,
    /// Nodes per type; absent types are omitted.
    pub node_types: BTreeMap<NodeType, usize>,
    /// Relationships per type; absent types are omitted.
    pub relationship_types: BTreeMap<RelationshipType, usize>,
    /// Nodes per language. Nodes without a language are not counted.
    pub languages: BTreeMap<String, usize>,
    /// Nodes per category. Nodes without a category are not counted.
    pub categories: BTreeMap<String, usize>,
    pub connected_components: usize,
    /// Nodes touched by no relationship.
    pub orphan_count: usize,
    /// Relationship endpoints per node (in + out).
    pub avg_degree: f64,
}

impl GraphStatistics {
    /// Compute statistics for the graph as it is now.
    pub fn compute(graph: &KnowledgeGraph) -> Self {
        let mut stats = GraphStatistics {
            total_nodes: graph.node_count(),
            total_relationships: graph.relationship_count(),
            ..Default::default()
        };

        for node in graph.nodes() {
            *stats.node_types.entry(node.node_type()).or_insert(0) += 1;
            if let Some(language) = &node.language {
                *stats.languages.entry(language.clone()).or_insert(0) += 1;
            }
            if let Some(category) = &node.category {
                *stats.categories.entry(category.clone()).or_insert(0) += 1;
            }
        }

        let mut touched: HashSet<&str> = HashSet::new();
        for rel in graph.relationships() {
            *stats
                .relationship_types
                .entry(rel.relationship_type())
                .or_insert(0) += 1;
            touched.insert(&rel.source_id);
            touched.insert(&rel.target_id);
        }

        stats.orphan_count = stats.total_nodes - touched.len();
        stats.connected_components = graph.connected_components().len();
        stats.avg_degree = if stats.total_nodes == 0 {
            0.0
        } else {
            (2 * stats.total_relationships) as f64 / stats.total_nodes as f64
        };

        stats
    }

    /// Count for one node type, zero if absent.
    pub fn nodes_of_type(&self, node_type: NodeType) -> usize {
        self.node_types.get(&node_type).copied().unwrap_or(0)
    }

    /// Count for one relationship type, zero if absent.
    pub fn relationships_of_type(&self, relationship_type: RelationshipType) -> usize {
        self.relationship_types
            .get(&relationship_type)
            .copied()
            .unwrap_or(0)
    }

    /// Node type distribution keyed by wire name.
    pub fn node_type_names(&self) -> BTreeMap<&'static str, usize> {
        self.node_types.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}
