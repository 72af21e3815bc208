//! Knowledge repository - entity operations expressed as store queries.

use knowledge_schema::{KnowledgeNode, KnowledgeRelationship, NodeType, NodeUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{
    node_from_row, node_properties, relationship_from_row, relationship_properties,
    update_properties, GraphStore, Record, StoreError,
};
use crate::config::QueryConfig;
use crate::knowledge_base::{Endpoint, GraphError, KnowledgeGraph};

const CREATE_NODE: &str = "CREATE (n:KnowledgeNode) SET n = $props RETURN n";

const GET_NODE: &str = "MATCH (n:KnowledgeNode {id: $node_id}) RETURN n";

const UPDATE_NODE: &str = "MATCH (n:KnowledgeNode {id: $node_id}) SET n += $updates RETURN n";

const DELETE_NODE: &str =
    "MATCH (n:KnowledgeNode {id: $node_id}) DETACH DELETE n RETURN count(n) AS deleted";

const NODES_BY_TYPE: &str =
    "MATCH (n:KnowledgeNode {node_type: $node_type}) RETURN n ORDER BY n.name";

const NODES_BY_LANGUAGE: &str =
    "MATCH (n:KnowledgeNode {language: $language}) RETURN n ORDER BY n.name";

const SEARCH_NODES: &str = "\
MATCH (n:KnowledgeNode)
WHERE $keyword = ''
   OR toLower(n.name) CONTAINS $keyword
   OR toLower(n.description) CONTAINS $keyword
   OR toLower(coalesce(n.category, '')) CONTAINS $keyword
RETURN n,
       CASE
           WHEN $keyword = '' THEN 3
           WHEN toLower(n.name) STARTS WITH $keyword THEN 1
           WHEN toLower(n.name) CONTAINS $keyword THEN 2
           ELSE 3
       END AS relevance_score
ORDER BY relevance_score, n.name
LIMIT $limit";

const SHORTEST_PATH: &str = "\
MATCH (start:KnowledgeNode {id: $source_id}), (end:KnowledgeNode {id: $target_id}),
      path = shortestPath((start)-[*]-(end))
RETURN [node IN nodes(path) | node.id] AS path_ids";

const RELATIONSHIP_EXISTS: &str =
    "MATCH ()-[r {id: $relationship_id}]->() RETURN r.id AS id LIMIT 1";

const ALL_NODES: &str = "MATCH (n:KnowledgeNode) RETURN n ORDER BY n.id";

const ALL_RELATIONSHIPS: &str = "\
MATCH (a:KnowledgeNode)-[r]->(b:KnowledgeNode)
RETURN r, a.id AS source_id, b.id AS target_id, type(r) AS relationship_type
ORDER BY r.id";

const COUNT_NODES: &str = "MATCH (n:KnowledgeNode) RETURN count(n) AS count";

const COUNT_RELATIONSHIPS: &str = "MATCH ()-[r]->() RETURN count(r) AS count";

const NODES_PER_TYPE: &str = "MATCH (n:KnowledgeNode) RETURN n.node_type AS key, count(n) AS count";

const NODES_PER_LANGUAGE: &str = "\
MATCH (n:KnowledgeNode) WHERE n.language IS NOT NULL
RETURN n.language AS key, count(n) AS count";

const NODES_PER_CATEGORY: &str = "\
MATCH (n:KnowledgeNode) WHERE n.category IS NOT NULL
RETURN n.category AS key, count(n) AS count";

const RELATIONSHIPS_PER_TYPE: &str = "MATCH ()-[r]->() RETURN type(r) AS key, count(r) AS count";

/// Schema statements issued by [`KnowledgeRepository::create_constraints`].
pub const CONSTRAINTS: &[&str] = &[
    "CREATE CONSTRAINT knowledge_node_id IF NOT EXISTS FOR (n:KnowledgeNode) REQUIRE n.id IS UNIQUE",
    "CREATE INDEX knowledge_node_type IF NOT EXISTS FOR (n:KnowledgeNode) ON (n.node_type)",
    "CREATE INDEX knowledge_node_language IF NOT EXISTS FOR (n:KnowledgeNode) ON (n.language)",
    "CREATE INDEX knowledge_node_category IF NOT EXISTS FOR (n:KnowledgeNode) ON (n.category)",
];

/// Aggregate counts computed by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStatistics {
    pub total_nodes: usize,
    pub total_relationships: usize,
    pub node_types: BTreeMap<String, usize>,
    /// Keyed by snake_case type name.
    pub relationship_types: BTreeMap<String, usize>,
    pub languages: BTreeMap<String, usize>,
    pub categories: BTreeMap<String, usize>,
    /// Weakly connected components, counted on the loaded graph.
    pub connected_components: usize,
}

/// Persists and queries entities through an injected [`GraphStore`].
pub struct KnowledgeRepository<S: GraphStore> {
    store: S,
    query: QueryConfig,
}

impl<S: GraphStore> KnowledgeRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            query: QueryConfig::default(),
        }
    }

    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query
    }

    /// Persist a new node. Fails with `DuplicateId` if the id is taken.
    pub fn create_node(&self, node: &KnowledgeNode) -> Result<(), GraphError> {
        if self.get_node(&node.id)?.is_some() {
            return Err(GraphError::duplicate_node(&node.id));
        }

        let params = params([("props", Value::Object(node_properties(node)?))]);
        self.store.run_write_query(CREATE_NODE, &params)?;
        info!(node_id = %node.id, "created node");
        Ok(())
    }

    pub fn get_node(&self, node_id: &str) -> Result<Option<KnowledgeNode>, GraphError> {
        let rows = self
            .store
            .run_read_query(GET_NODE, &params([("node_id", json!(node_id))]))?;
        Ok(rows.first().map(|row| node_from_row(row, "n")).transpose()?)
    }

    /// Apply a partial update. Returns `false` if no node has this id.
    pub fn update_node(&self, node_id: &str, update: &NodeUpdate) -> Result<bool, GraphError> {
        update.validate()?;

        let mut updates = update_properties(update)?;
        updates.insert(
            "updated_at".to_string(),
            json!(chrono::Utc::now().to_rfc3339()),
        );

        let rows = self.store.run_write_query(
            UPDATE_NODE,
            &params([("node_id", json!(node_id)), ("updates", Value::Object(updates))]),
        )?;
        let updated = !rows.is_empty();
        if updated {
            info!(node_id, "updated node");
        }
        Ok(updated)
    }

    /// Delete a node together with its relationships.
    pub fn delete_node(&self, node_id: &str) -> Result<bool, GraphError> {
        let rows = self
            .store
            .run_write_query(DELETE_NODE, &params([("node_id", json!(node_id))]))?;
        let deleted = rows
            .first()
            .and_then(|row| row.get("deleted"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if deleted > 0 {
            info!(node_id, "deleted node");
        }
        Ok(deleted > 0)
    }

    /// Whether a relationship with this id is stored.
    pub fn contains_relationship(&self, relationship_id: &str) -> Result<bool, GraphError> {
        let rows = self.store.run_read_query(
            RELATIONSHIP_EXISTS,
            &params([("relationship_id", json!(relationship_id))]),
        )?;
        Ok(!rows.is_empty())
    }

    /// Persist a relationship between two stored nodes. Fails with
    /// `DuplicateId` if the id is taken.
    pub fn create_relationship(&self, rel: &KnowledgeRelationship) -> Result<(), GraphError> {
        if self.contains_relationship(&rel.id)? {
            return Err(GraphError::duplicate_relationship(&rel.id));
        }

        // The type label is rendered from the enum, never from caller text.
        let query = format!(
            "MATCH (a:KnowledgeNode {{id: $source_id}})\n\
             MATCH (b:KnowledgeNode {{id: $target_id}})\n\
             CREATE (a)-[r:{}]->(b) SET r = $props\n\
             RETURN r",
            rel.relationship_type().label()
        );
        let params = params([
            ("source_id", json!(rel.source_id)),
            ("target_id", json!(rel.target_id)),
            ("props", Value::Object(relationship_properties(rel)?)),
        ]);

        let rows = self.store.run_write_query(&query, &params)?;
        if rows.is_empty() {
            let (endpoint, node_id) = if self.get_node(&rel.source_id)?.is_none() {
                (Endpoint::Source, &rel.source_id)
            } else {
                (Endpoint::Target, &rel.target_id)
            };
            return Err(GraphError::DanglingEndpoint {
                relationship_id: rel.id.clone(),
                endpoint,
                node_id: node_id.clone(),
            });
        }

        info!(relationship_id = %rel.id, "created relationship");
        Ok(())
    }

    /// Nodes of one type, ordered by name.
    pub fn nodes_by_type(&self, node_type: NodeType) -> Result<Vec<KnowledgeNode>, GraphError> {
        self.read_nodes(NODES_BY_TYPE, params([("node_type", json!(node_type))]))
    }

    /// Nodes for one language, ordered by name.
    pub fn nodes_by_language(&self, language: &str) -> Result<Vec<KnowledgeNode>, GraphError> {
        self.read_nodes(NODES_BY_LANGUAGE, params([("language", json!(language))]))
    }

    /// Ranked keyword search; `limit` defaults and caps per the query config.
    pub fn search_nodes(
        &self,
        keyword: &str,
        limit: Option<usize>,
    ) -> Result<Vec<KnowledgeNode>, GraphError> {
        let limit = self.query.clamp_limit(limit);
        let keyword = keyword.trim().to_lowercase();
        self.read_nodes(
            SEARCH_NODES,
            params([("keyword", json!(keyword)), ("limit", json!(limit))]),
        )
    }

    /// Fewest-hop path between two stored nodes, in either direction.
    pub fn find_shortest_path(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> Result<Option<Vec<String>>, GraphError> {
        if source_id == target_id {
            return Ok(self
                .get_node(source_id)?
                .map(|node| vec![node.id]));
        }

        let rows = self.store.run_read_query(
            SHORTEST_PATH,
            &params([("source_id", json!(source_id)), ("target_id", json!(target_id))]),
        )?;
        Ok(rows.first().map(path_ids).transpose()?)
    }

    /// Shortest prerequisite walk to a leaf; see [`KnowledgeGraph::learning_path`].
    pub fn learning_path(
        &self,
        start_id: &str,
        max_depth: Option<usize>,
    ) -> Result<Vec<String>, GraphError> {
        let depth = max_depth.unwrap_or(self.query.learning_path_depth);
        if depth == 0 {
            return Ok(Vec::new());
        }

        // Variable-length bounds cannot be parameters; depth is a plain integer.
        let query = format!(
            "MATCH (start:KnowledgeNode {{id: $start_id}})\n\
             MATCH path = (start)-[:PREREQUISITE|DEPENDS_ON*1..{depth}]->(end:KnowledgeNode)\n\
             WHERE NOT exists((end)-[:PREREQUISITE|DEPENDS_ON]->())\n\
             RETURN [node IN nodes(path) | node.id] AS path_ids\n\
             ORDER BY length(path), path_ids\n\
             LIMIT 1"
        );
        let rows = self
            .store
            .run_read_query(&query, &params([("start_id", json!(start_id))]))?;
        let path = rows.first().map(path_ids).transpose()?.unwrap_or_default();
        debug!(start = start_id, depth, hops = path.len().saturating_sub(1), "learning path");
        Ok(path)
    }

    /// Counts and distributions computed by the store. The component count
    /// needs the whole graph and goes through [`load_graph`](Self::load_graph).
    pub fn statistics(&self) -> Result<StoreStatistics, GraphError> {
        let relationship_types = self
            .count_by(RELATIONSHIPS_PER_TYPE)?
            .into_iter()
            .map(|(label, count)| (label.to_ascii_lowercase(), count))
            .collect();

        Ok(StoreStatistics {
            total_nodes: self.scalar_count(COUNT_NODES)?,
            total_relationships: self.scalar_count(COUNT_RELATIONSHIPS)?,
            node_types: self.count_by(NODES_PER_TYPE)?,
            relationship_types,
            languages: self.count_by(NODES_PER_LANGUAGE)?,
            categories: self.count_by(NODES_PER_CATEGORY)?,
            connected_components: self.load_graph()?.connected_components().len(),
        })
    }

    /// Create the uniqueness constraint on node ids and lookup indexes.
    pub fn create_constraints(&self) -> Result<(), GraphError> {
        for statement in CONSTRAINTS {
            self.store.run_write_query(statement, &Record::new())?;
        }
        info!(count = CONSTRAINTS.len(), "created constraints and indexes");
        Ok(())
    }

    /// Read every stored node and relationship into a fresh in-memory graph.
    pub fn load_graph(&self) -> Result<KnowledgeGraph, GraphError> {
        let mut graph = KnowledgeGraph::new();

        for row in self.store.run_read_query(ALL_NODES, &Record::new())? {
            graph.add_node(node_from_row(&row, "n")?)?;
        }
        for row in self.store.run_read_query(ALL_RELATIONSHIPS, &Record::new())? {
            graph.add_relationship(relationship_from_row(&row)?)?;
        }

        info!(
            nodes = graph.node_count(),
            relationships = graph.relationship_count(),
            "loaded graph from store"
        );
        Ok(graph)
    }

    fn read_nodes(&self, query: &str, params: Record) -> Result<Vec<KnowledgeNode>, GraphError> {
        let rows = self.store.run_read_query(query, &params)?;
        let nodes = rows
            .iter()
            .map(|row| node_from_row(row, "n"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn scalar_count(&self, query: &str) -> Result<usize, StoreError> {
        let rows = self.store.run_read_query(query, &Record::new())?;
        Ok(rows.first().map(count_column).transpose()?.unwrap_or(0))
    }

    fn count_by(&self, query: &str) -> Result<BTreeMap<String, usize>, StoreError> {
        let mut counts = BTreeMap::new();
        for row in self.store.run_read_query(query, &Record::new())? {
            let Some(key) = row.get("key").and_then(Value::as_str) else {
                continue;
            };
            counts.insert(key.to_string(), count_column(&row)?);
        }
        Ok(counts)
    }
}

fn params<const N: usize>(entries: [(&str, Value); N]) -> Record {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn path_ids(row: &Record) -> Result<Vec<String>, StoreError> {
    let ids = row
        .get("path_ids")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::decode("path row", "missing column 'path_ids'"))?;
    ids.iter()
        .map(|id| {
            id.as_str()
                .map(str::to_string)
                .ok_or_else(|| StoreError::decode("path row", format!("non-string id {id}")))
        })
        .collect()
}

fn count_column(row: &Record) -> Result<usize, StoreError> {
    row.get("count")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| StoreError::decode("count row", "missing column 'count'"))
}
