//! Keyword search with deterministic relevance ranking.

use knowledge_schema::KnowledgeNode;
use serde::{Deserialize, Serialize};

use crate::knowledge_base::KnowledgeGraph;

/// How well a node matched a keyword. Lower ranks sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRank {
    /// The name starts with the keyword.
    NamePrefix = 1,
    /// The name contains the keyword elsewhere.
    NameContains = 2,
    /// Only the description or category contains the keyword.
    Other = 3,
}

impl MatchRank {
    /// Rank `node` against an already lower-cased, trimmed keyword.
    ///
    /// An empty keyword matches every node as [`MatchRank::Other`].
    pub fn of(node: &KnowledgeNode, keyword: &str) -> Option<Self> {
        if keyword.is_empty() {
            return Some(MatchRank::Other);
        }

        let name = node.name.to_lowercase();
        if name.starts_with(keyword) {
            return Some(MatchRank::NamePrefix);
        }
        if name.contains(keyword) {
            return Some(MatchRank::NameContains);
        }

        let in_description = node.description.to_lowercase().contains(keyword);
        let in_category = node
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(keyword));
        (in_description || in_category).then_some(MatchRank::Other)
    }

    pub fn score(&self) -> u8 {
        *self as u8
    }
}

/// A search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub node: &'a KnowledgeNode,
    pub rank: MatchRank,
}

impl KnowledgeGraph {
    /// Case-insensitive keyword search over name, description and category.
    ///
    /// Results are ordered by rank then name, and truncated to `limit`.
    pub fn search_nodes(&self, keyword: &str, limit: usize) -> Vec<&KnowledgeNode> {
        self.search_ranked(keyword, limit)
            .into_iter()
            .map(|hit| hit.node)
            .collect()
    }

    /// Same as [`search_nodes`](Self::search_nodes), keeping each hit's rank.
    pub fn search_ranked(&self, keyword: &str, limit: usize) -> Vec<SearchHit<'_>> {
        let keyword = keyword.trim().to_lowercase();

        let mut hits: Vec<SearchHit<'_>> = self
            .nodes()
            .filter_map(|node| MatchRank::of(node, &keyword).map(|rank| SearchHit { node, rank }))
            .collect();

        hits.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| a.node.name.cmp(&b.node.name))
                .then_with(|| a.node.id.cmp(&b.node.id))
        });
        hits.truncate(limit);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge_schema::NodeType;

    fn graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        let nodes = [
            ("n1", "Say Hello", "greeting program", None),
            ("n2", "Hello World", "first program", None),
            ("n3", "Pointers", "memory addresses; hello to segfaults", None),
            ("n4", "Lambdas", "anonymous functions", Some("hello-category")),
            ("n5", "Templates", "generic code", None),
        ];
        for (id, name, description, category) in nodes {
            let mut node = KnowledgeNode::new(id, name, NodeType::Concept, description).unwrap();
            if let Some(category) = category {
                node = node.with_category(category);
            }
            graph.add_node(node).unwrap();
        }
        graph
    }

    fn names(nodes: &[&KnowledgeNode]) -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn test_prefix_beats_substring() {
        let graph = graph();
        let results = graph.search_nodes("hello", 10);
        assert_eq!(
            names(&results),
            vec!["Hello World", "Say Hello", "Lambdas", "Pointers"]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let graph = graph();
        let hits = graph.search_ranked("HELLO", 10);
        assert_eq!(hits[0].rank, MatchRank::NamePrefix);
        assert_eq!(hits[1].rank, MatchRank::NameContains);
        assert_eq!(hits[2].rank.score(), 3);
    }

    #[test]
    fn test_limit() {
        let graph = graph();
        assert_eq!(graph.search_nodes("hello", 1).len(), 1);
        assert!(graph.search_nodes("hello", 0).is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(graph().search_nodes("rust", 10).is_empty());
    }

    #[test]
    fn test_empty_keyword_matches_all_by_name() {
        let graph = graph();
        let results = graph.search_nodes("  ", 10);
        assert_eq!(
            names(&results),
            vec!["Hello World", "Lambdas", "Pointers", "Say Hello", "Templates"]
        );
    }
}
