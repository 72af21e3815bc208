//! End-to-end properties of the in-memory graph.

use knowledge_core::{
    export_payload, import_into_graph, read_payload, validate_payload, write_payload, ExportFilter,
    GraphError, GraphStatistics, KnowledgeGraph,
};
use knowledge_core::knowledge_schema::{
    Kind, KnowledgeNode, KnowledgeRelationship, NodeType, RelationshipType,
};
use serde_json::json;
use std::collections::BTreeSet;

fn concept(id: &str, name: &str) -> KnowledgeNode {
    KnowledgeNode::new(id, name, NodeType::Concept, format!("{name} explained")).unwrap()
}

fn link(id: &str, from: &str, to: &str, kind: RelationshipType) -> KnowledgeRelationship {
    KnowledgeRelationship::new(id, from, to, kind).unwrap()
}

fn chain() -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();
    for id in ["A", "B", "C", "D"] {
        graph.add_node(concept(id, id)).unwrap();
    }
    graph.add_relationship(link("ab", "A", "B", RelationshipType::Prerequisite)).unwrap();
    graph.add_relationship(link("bc", "B", "C", RelationshipType::Prerequisite)).unwrap();
    graph.add_relationship(link("cd", "C", "D", RelationshipType::Prerequisite)).unwrap();
    graph
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_import_counts_match_graph() {
    let payload = json!({
        "metadata": {"name": "sample"},
        "nodes": [
            {"id": "a", "name": "A", "node_type": "concept", "description": ""},
            {"id": "b", "name": "B", "node_type": "concept", "description": ""},
            {"id": "c", "name": "C", "node_type": "concept", "description": ""},
        ],
        "relationships": [
            {"id": "ab", "source_id": "a", "target_id": "b", "relationship_type": "uses"},
            {"id": "bc", "source_id": "b", "target_id": "c", "relationship_type": "uses"},
        ],
    });
    assert!(validate_payload(&payload).is_valid());

    let mut graph = KnowledgeGraph::new();
    let summary = import_into_graph(&mut graph, &payload);

    assert_eq!(summary.nodes_imported, 3);
    assert_eq!(summary.relationships_imported, 2);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.relationship_count(), 2);

    let stats = GraphStatistics::compute(&graph);
    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.total_relationships, 2);
}

#[test]
fn test_dangling_endpoints_always_rejected() {
    let mut graph = chain();
    for &kind in RelationshipType::ALL {
        for (source, target) in [("A", "Z"), ("Z", "A"), ("Y", "Z")] {
            let err = graph
                .add_relationship(link("new", source, target, kind))
                .unwrap_err();
            assert!(matches!(err, GraphError::DanglingEndpoint { .. }), "{kind:?}");
        }
    }
    assert_eq!(graph.relationship_count(), 3);
}

#[test]
fn test_removal_cascades() {
    let mut graph = chain();
    assert!(graph.remove_node("B"));

    assert!(graph.relationships().all(|r| !r.touches("B")));
    assert_eq!(graph.relationship_count(), 1);
    assert_eq!(GraphStatistics::compute(&graph).total_relationships, 1);
}

#[test]
fn test_chain_paths() {
    let graph = chain();

    assert_eq!(graph.find_shortest_path("A", "D"), Some(strings(&["A", "B", "C", "D"])));
    assert_eq!(graph.find_shortest_path("D", "A"), None);
    assert_eq!(graph.find_shortest_path("C", "C"), Some(strings(&["C"])));
    assert_eq!(graph.learning_path("A", 5), strings(&["A", "B", "C", "D"]));
}

#[test]
fn test_disconnected_nodes_have_no_path() {
    let mut graph = chain();
    graph.add_node(concept("island", "Island")).unwrap();
    assert_eq!(graph.find_shortest_path("A", "island"), None);
}

#[test]
fn test_bidirectional_adjacency() {
    let mut graph = KnowledgeGraph::new();
    for id in ["x", "y", "z"] {
        graph.add_node(concept(id, id)).unwrap();
    }
    graph
        .add_relationship(link("xy", "x", "y", RelationshipType::SimilarTo).bidirectional())
        .unwrap();
    graph.add_relationship(link("xz", "x", "z", RelationshipType::Uses)).unwrap();

    let from_y: Vec<&str> = graph.adjacent_nodes("y").iter().map(|(n, _)| n.id.as_str()).collect();
    let from_z: Vec<&str> = graph.adjacent_nodes("z").iter().map(|(n, _)| n.id.as_str()).collect();
    assert_eq!(from_y, vec!["x"]);
    assert!(from_z.is_empty());
}

#[test]
fn test_search_prefix_beats_substring() {
    let mut graph = KnowledgeGraph::new();
    graph.add_node(concept("1", "Say Hello")).unwrap();
    graph.add_node(concept("2", "Hello World")).unwrap();

    let names: Vec<&str> = graph
        .search_nodes("hello", 10)
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["Hello World", "Say Hello"]);
}

#[test]
fn test_components_partition_nodes() {
    let mut graph = chain();
    for id in ["p", "q", "r"] {
        graph.add_node(concept(id, id)).unwrap();
    }
    graph.add_relationship(link("pq", "q", "p", RelationshipType::RelatedTo)).unwrap();

    let components = graph.connected_components();
    assert_eq!(components.len(), 3);

    let mut seen = BTreeSet::new();
    for component in &components {
        for id in component {
            assert!(seen.insert(id.clone()), "{id} appears in two components");
        }
    }
    let all: BTreeSet<String> = graph.node_ids().map(str::to_string).collect();
    assert_eq!(seen, all);
}

#[test]
fn test_statistics_track_mutations() {
    let mut graph = KnowledgeGraph::new();
    for id in ["a", "b", "c"] {
        graph.add_node(concept(id, id)).unwrap();
    }
    graph.add_relationship(link("ab", "a", "b", RelationshipType::Uses)).unwrap();
    graph.add_relationship(link("bc", "b", "c", RelationshipType::Uses)).unwrap();

    let stats = GraphStatistics::compute(&graph);
    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.total_relationships, 2);
    assert_eq!(stats.relationships_of_type(RelationshipType::Uses), 2);
    assert_eq!(stats.connected_components, 1);
}

#[test]
fn test_export_file_round_trip() {
    let graph = chain();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    write_payload(&path, &export_payload(&graph, &ExportFilter::new())).unwrap();

    let mut restored = KnowledgeGraph::new();
    let summary = import_into_graph(&mut restored, &read_payload(&path).unwrap());
    assert!(summary.is_complete());
    assert_eq!(restored.learning_path("A", 5), graph.learning_path("A", 5));
}
