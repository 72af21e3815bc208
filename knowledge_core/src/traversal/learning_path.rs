//! Learning paths along prerequisite and dependency edges.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::knowledge_base::KnowledgeGraph;

impl KnowledgeGraph {
    /// The shortest walk from `start_id` along `prerequisite` / `depends_on`
    /// edges that ends on a node with no such outgoing edge.
    ///
    /// The walk takes at least one and at most `max_depth` hops and never
    /// revisits a node. Edge direction is always source to target, even for
    /// bidirectional relationships. Among walks of equal length the
    /// lexicographically smallest id sequence wins.
    ///
    /// Returns an empty path if the start is unknown, `max_depth` is zero, or
    /// no walk reaches a leaf in time.
    pub fn learning_path(&self, start_id: &str, max_depth: usize) -> Vec<String> {
        if max_depth == 0 || !self.contains_node(start_id) {
            return Vec::new();
        }

        let successors = self.prerequisite_successors();
        let is_leaf = |id: &str| successors.get(id).map_or(true, BTreeSet::is_empty);

        // A shortest terminating walk reaches every node on it at that node's
        // BFS depth, so one smallest prefix per newly reached node is enough.
        let mut reached: BTreeSet<&str> = BTreeSet::from([start_id]);
        let mut frontier: BTreeMap<&str, Vec<&str>> = BTreeMap::from([(start_id, vec![start_id])]);

        for depth in 1..=max_depth {
            let mut layer: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

            for (&last, walk) in &frontier {
                for &next in successors.get(last).into_iter().flatten() {
                    if reached.contains(next) {
                        continue;
                    }
                    match layer.entry(next) {
                        Entry::Vacant(slot) => {
                            let mut longer = walk.clone();
                            longer.push(next);
                            slot.insert(longer);
                        }
                        Entry::Occupied(mut slot) => {
                            let held = slot.get();
                            if walk.as_slice() < &held[..held.len() - 1] {
                                let mut longer = walk.clone();
                                longer.push(next);
                                slot.insert(longer);
                            }
                        }
                    }
                }
            }

            let best = layer
                .iter()
                .filter(|(id, _)| is_leaf(id))
                .map(|(_, walk)| walk)
                .min();
            if let Some(best) = best {
                debug!(start = start_id, depth, "learning path found");
                return best.iter().map(|id| id.to_string()).collect();
            }
            if layer.is_empty() {
                break;
            }
            reached.extend(layer.keys().copied());
            frontier = layer;
        }

        Vec::new()
    }

    /// Forward successors over learning edges, sorted and deduplicated.
    fn prerequisite_successors(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut successors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for rel in self.relationships() {
            if rel.relationship_type().is_prerequisite_edge() {
                successors
                    .entry(rel.source_id.as_str())
                    .or_default()
                    .insert(rel.target_id.as_str());
            }
        }
        successors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge_schema::{KnowledgeNode, KnowledgeRelationship, NodeType, RelationshipType};

    fn graph_with(nodes: &[&str], edges: &[(&str, &str, RelationshipType)]) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        for id in nodes {
            graph
                .add_node(KnowledgeNode::new(*id, *id, NodeType::Concept, "").unwrap())
                .unwrap();
        }
        for (i, (from, to, kind)) in edges.iter().enumerate() {
            graph
                .add_relationship(KnowledgeRelationship::new(format!("r{i}"), *from, *to, *kind).unwrap())
                .unwrap();
        }
        graph
    }

    fn path(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_follows_chain_to_leaf() {
        let graph = graph_with(
            &["a", "b", "c"],
            &[
                ("a", "b", RelationshipType::Prerequisite),
                ("b", "c", RelationshipType::DependsOn),
            ],
        );

        assert_eq!(graph.learning_path("a", 5), path(&["a", "b", "c"]));
        assert_eq!(graph.learning_path("b", 5), path(&["b", "c"]));
    }

    #[test]
    fn test_leaf_start_has_no_path() {
        let graph = graph_with(&["a", "b"], &[("a", "b", RelationshipType::Prerequisite)]);
        assert!(graph.learning_path("b", 5).is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let graph = graph_with(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", RelationshipType::Prerequisite),
                ("b", "c", RelationshipType::Prerequisite),
                ("c", "d", RelationshipType::Prerequisite),
            ],
        );

        assert!(graph.learning_path("a", 2).is_empty());
        assert_eq!(graph.learning_path("a", 3), path(&["a", "b", "c", "d"]));
        assert!(graph.learning_path("a", 0).is_empty());
    }

    #[test]
    fn test_ignores_other_edge_types() {
        let graph = graph_with(
            &["a", "b", "c"],
            &[
                ("a", "b", RelationshipType::RelatedTo),
                ("a", "c", RelationshipType::Prerequisite),
            ],
        );
        assert_eq!(graph.learning_path("a", 5), path(&["a", "c"]));
    }

    #[test]
    fn test_prefers_shortest_then_smallest() {
        let graph = graph_with(
            &["start", "x", "y", "z", "leaf"],
            &[
                ("start", "z", RelationshipType::Prerequisite),
                ("z", "leaf", RelationshipType::Prerequisite),
                ("start", "y", RelationshipType::Prerequisite),
                ("start", "x", RelationshipType::Prerequisite),
                ("x", "leaf", RelationshipType::Prerequisite),
                ("y", "leaf", RelationshipType::Prerequisite),
            ],
        );

        assert_eq!(graph.learning_path("start", 5), path(&["start", "x", "leaf"]));
    }

    #[test]
    fn test_cycle_without_leaf() {
        let graph = graph_with(
            &["a", "b"],
            &[
                ("a", "b", RelationshipType::Prerequisite),
                ("b", "a", RelationshipType::Prerequisite),
            ],
        );
        assert!(graph.learning_path("a", 10).is_empty());
    }

    #[test]
    fn test_bidirectional_flag_ignored() {
        let mut graph = graph_with(&["a", "b"], &[]);
        graph
            .add_relationship(
                KnowledgeRelationship::new("r", "b", "a", RelationshipType::Prerequisite)
                    .unwrap()
                    .bidirectional(),
            )
            .unwrap();

        assert!(graph.learning_path("a", 3).is_empty());
        assert_eq!(graph.learning_path("b", 3), path(&["b", "a"]));
    }

    #[test]
    fn test_unknown_start() {
        let graph = graph_with(&["a"], &[]);
        assert!(graph.learning_path("ghost", 5).is_empty());
    }

    fn complete(n: usize) -> (KnowledgeGraph, Vec<String>) {
        let ids: Vec<String> = (0..n).map(|i| format!("n{i:02}")).collect();
        let mut graph = KnowledgeGraph::new();
        for id in &ids {
            graph
                .add_node(KnowledgeNode::new(id.as_str(), id.as_str(), NodeType::Concept, "").unwrap())
                .unwrap();
        }
        for from in &ids {
            for to in &ids {
                if from != to {
                    let rel = KnowledgeRelationship::new(
                        format!("{from}-{to}"),
                        from.as_str(),
                        to.as_str(),
                        RelationshipType::Prerequisite,
                    )
                    .unwrap();
                    graph.add_relationship(rel).unwrap();
                }
            }
        }
        (graph, ids)
    }

    #[test]
    fn test_dense_cyclic_graph_without_leaf() {
        let (graph, _) = complete(40);
        assert!(graph.learning_path("n00", 40).is_empty());
    }

    #[test]
    fn test_dense_graph_finds_distant_leaf() {
        let (mut graph, ids) = complete(40);
        graph
            .add_node(KnowledgeNode::new("leaf", "Leaf", NodeType::Concept, "").unwrap())
            .unwrap();
        graph
            .add_relationship(
                KnowledgeRelationship::new("to-leaf", "n39", "leaf", RelationshipType::DependsOn).unwrap(),
            )
            .unwrap();

        assert_eq!(graph.learning_path("n00", 40), path(&["n00", "n39", "leaf"]));
        assert_eq!(graph.learning_path("n39", 40), path(&["n39", "leaf"]));
        assert!(graph.learning_path(&ids[0], 1).is_empty());
    }

    #[test]
    fn test_tie_break_across_shared_prefixes() {
        let graph = graph_with(
            &["s", "a", "b", "m", "n", "leaf"],
            &[
                ("s", "b", RelationshipType::Prerequisite),
                ("s", "a", RelationshipType::Prerequisite),
                ("b", "m", RelationshipType::Prerequisite),
                ("a", "n", RelationshipType::Prerequisite),
                ("a", "m", RelationshipType::Prerequisite),
                ("m", "leaf", RelationshipType::Prerequisite),
                ("n", "leaf", RelationshipType::Prerequisite),
            ],
        );
        assert_eq!(graph.learning_path("s", 5), path(&["s", "a", "m", "leaf"]));
    }
}
