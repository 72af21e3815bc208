//! Traversal - structural queries over the knowledge graph.
//!
//! All traversals read the graph's current state and never mutate it:
//! 1. **Adjacency**: nodes reachable in one hop, respecting direction
//! 2. **Shortest path**: breadth-first search over adjacency (unweighted)
//! 3. **Components**: connected groups, ignoring direction
//! 4. **Learning path**: shortest walk along prerequisite edges to a leaf

mod learning_path;

pub use learning_path::*;

use knowledge_schema::{KnowledgeNode, KnowledgeRelationship};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use tracing::trace;

use crate::knowledge_base::KnowledgeGraph;

/// A node's declared prerequisites, split by whether they resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteChain {
    /// Prerequisite ids present in the graph, in declared order.
    pub resolved: Vec<String>,
    /// Prerequisite ids with no matching node.
    pub missing: Vec<String>,
}

impl KnowledgeGraph {
    /// Nodes one hop away from `node_id`, paired with the relationship used.
    ///
    /// Follows every relationship out of the node, plus bidirectional
    /// relationships into it. Ordered by relationship id.
    pub fn adjacent_nodes(&self, node_id: &str) -> Vec<(&KnowledgeNode, &KnowledgeRelationship)> {
        self.relationships()
            .filter_map(|rel| {
                rel.neighbor_of(node_id)
                    .and_then(|id| self.get_node(id))
                    .map(|node| (node, rel))
            })
            .collect()
    }

    /// Fewest-hop path from `source_id` to `target_id`, both ends included.
    ///
    /// Relationship weights are ignored. Returns `None` if either id is
    /// unknown or the target is unreachable.
    pub fn find_shortest_path(&self, source_id: &str, target_id: &str) -> Option<Vec<String>> {
        if !self.contains_node(source_id) || !self.contains_node(target_id) {
            return None;
        }

        let adjacency = self.adjacency_index();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, Vec<&str>)> = VecDeque::new();

        visited.insert(source_id);
        queue.push_back((source_id, vec![source_id]));

        while let Some((current, path)) = queue.pop_front() {
            if current == target_id {
                trace!(source = source_id, target = target_id, hops = path.len() - 1, "path found");
                return Some(path.into_iter().map(str::to_string).collect());
            }

            for &next in adjacency.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    let mut next_path = path.clone();
                    next_path.push(next);
                    queue.push_back((next, next_path));
                }
            }
        }

        None
    }

    /// Partition the nodes into connected groups, treating every relationship
    /// as undirected.
    ///
    /// Every node appears in exactly one component; isolated nodes are
    /// singletons. Components are ordered by their smallest id.
    pub fn connected_components(&self) -> Vec<BTreeSet<String>> {
        let mut undirected: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for rel in self.relationships() {
            undirected
                .entry(rel.source_id.as_str())
                .or_default()
                .push(rel.target_id.as_str());
            undirected
                .entry(rel.target_id.as_str())
                .or_default()
                .push(rel.source_id.as_str());
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut components = Vec::new();

        for start in self.node_ids() {
            if !visited.insert(start) {
                continue;
            }

            let mut component = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                component.insert(current.to_string());
                for &next in undirected.get(current).into_iter().flatten() {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// Resolve a node's declared prerequisites against the graph.
    ///
    /// Returns `None` if the node does not exist.
    pub fn prerequisite_chain(&self, node_id: &str) -> Option<PrerequisiteChain> {
        let node = self.get_node(node_id)?;

        let mut chain = PrerequisiteChain::default();
        for id in &node.prerequisites {
            if self.contains_node(id) {
                chain.resolved.push(id.clone());
            } else {
                chain.missing.push(id.clone());
            }
        }
        Some(chain)
    }

    /// Directed adjacency (with bidirectional reverse edges) for bulk traversal.
    fn adjacency_index(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut index: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for rel in self.relationships() {
            index
                .entry(rel.source_id.as_str())
                .or_default()
                .push(rel.target_id.as_str());
            if rel.bidirectional {
                index
                    .entry(rel.target_id.as_str())
                    .or_default()
                    .push(rel.source_id.as_str());
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge_schema::{NodeType, RelationshipType};

    fn graph_with(nodes: &[&str], edges: &[(&str, &str, bool)]) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        for id in nodes {
            graph
                .add_node(KnowledgeNode::new(*id, *id, NodeType::Concept, "").unwrap())
                .unwrap();
        }
        for (i, (from, to, both_ways)) in edges.iter().enumerate() {
            let mut rel =
                KnowledgeRelationship::new(format!("r{i}"), *from, *to, RelationshipType::RelatedTo)
                    .unwrap();
            if *both_ways {
                rel = rel.bidirectional();
            }
            graph.add_relationship(rel).unwrap();
        }
        graph
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn ids(pairs: &[(&KnowledgeNode, &KnowledgeRelationship)]) -> Vec<String> {
        pairs.iter().map(|(n, _)| n.id.clone()).collect()
    }

    #[test]
    fn test_adjacency_respects_direction() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b", false), ("c", "a", false)]);

        assert_eq!(ids(&graph.adjacent_nodes("a")), vec!["b"]);
        assert!(graph.adjacent_nodes("b").is_empty());
        assert_eq!(ids(&graph.adjacent_nodes("c")), vec!["a"]);
    }

    #[test]
    fn test_adjacency_bidirectional() {
        let graph = graph_with(&["a", "b"], &[("a", "b", true)]);

        assert_eq!(ids(&graph.adjacent_nodes("a")), vec!["b"]);
        assert_eq!(ids(&graph.adjacent_nodes("b")), vec!["a"]);
    }

    #[test]
    fn test_adjacency_unknown_node() {
        let graph = graph_with(&["a"], &[]);
        assert!(graph.adjacent_nodes("zzz").is_empty());
    }

    #[test]
    fn test_shortest_path_basic() {
        let graph = graph_with(
            &["a", "b", "c", "d"],
            &[("a", "b", false), ("b", "c", false), ("c", "d", false), ("a", "c", false)],
        );

        assert_eq!(
            graph.find_shortest_path("a", "d"),
            Some(vec!["a".to_string(), "c".to_string(), "d".to_string()])
        );
        assert_eq!(graph.find_shortest_path("d", "a"), None);
    }

    #[test]
    fn test_shortest_path_to_self() {
        let graph = graph_with(&["a"], &[]);
        assert_eq!(graph.find_shortest_path("a", "a"), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_shortest_path_unknown_ids() {
        let graph = graph_with(&["a"], &[]);
        assert_eq!(graph.find_shortest_path("a", "ghost"), None);
        assert_eq!(graph.find_shortest_path("ghost", "ghost"), None);
    }

    #[test]
    fn test_shortest_path_through_bidirectional_edge() {
        let graph = graph_with(&["a", "b", "c"], &[("b", "a", true), ("b", "c", false)]);
        assert_eq!(
            graph.find_shortest_path("a", "c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_components_ignore_direction() {
        let graph = graph_with(
            &["a", "b", "c", "d", "e"],
            &[("b", "a", false), ("c", "b", false), ("e", "d", false)],
        );

        let components = graph.connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], set(&["a", "b", "c"]));
        assert_eq!(components[1], set(&["d", "e"]));
    }

    #[test]
    fn test_components_isolated_nodes() {
        let graph = graph_with(&["x", "y"], &[]);
        let components = graph.connected_components();
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_components_empty_graph() {
        assert!(KnowledgeGraph::new().connected_components().is_empty());
    }

    #[test]
    fn test_prerequisite_chain() {
        let mut graph = graph_with(&["basics"], &[]);
        graph
            .add_node(
                KnowledgeNode::new("templates", "Templates", NodeType::Concept, "")
                    .unwrap()
                    .with_prerequisite("basics")
                    .with_prerequisite("classes"),
            )
            .unwrap();

        let chain = graph.prerequisite_chain("templates").unwrap();
        assert_eq!(chain.resolved, vec!["basics"]);
        assert_eq!(chain.missing, vec!["classes"]);
        assert!(graph.prerequisite_chain("ghost").is_none());
    }
}
