//! Graph-level error types.

use knowledge_schema::ValidationError;
use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Which kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Relationship,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => f.write_str("node"),
            EntityKind::Relationship => f.write_str("relationship"),
        }
    }
}

/// Which end of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

/// Errors raised by graph mutations and store-backed operations.
///
/// Lookups that miss are not errors; they return `None` or `false`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An entity with this id already exists.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    /// A relationship endpoint does not name a node in the graph.
    #[error("relationship {relationship_id} references unknown {endpoint} node: {node_id}")]
    DanglingEndpoint {
        relationship_id: String,
        endpoint: Endpoint,
        node_id: String,
    },

    /// An entity field is malformed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The persistent store failed.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl GraphError {
    pub fn duplicate_node(id: impl Into<String>) -> Self {
        GraphError::DuplicateId {
            kind: EntityKind::Node,
            id: id.into(),
        }
    }

    pub fn duplicate_relationship(id: impl Into<String>) -> Self {
        GraphError::DuplicateId {
            kind: EntityKind::Relationship,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GraphError::duplicate_node("cpp").to_string(),
            "duplicate node id: cpp"
        );

        let err = GraphError::DanglingEndpoint {
            relationship_id: "r1".to_string(),
            endpoint: Endpoint::Target,
            node_id: "ghost".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "relationship r1 references unknown target node: ghost"
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err: GraphError = ValidationError::missing("id").into();
        assert!(matches!(err, GraphError::Validation(_)));
    }
}
