//! Store adapter - the contract with a persistent property-graph database.
//!
//! The core never talks to a database directly. Anything that can run a
//! parameterized query and hand back rows implements [`GraphStore`];
//! [`KnowledgeRepository`] builds the queries for every entity operation.

mod codec;
mod repository;

pub use codec::*;
pub use repository::*;

pub use knowledge_schema::Record;
use thiserror::Error;

/// Errors raised by a store or while decoding its rows.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected or failed to run a query.
    #[error("query failed: {message}")]
    Query { message: String },

    /// The store could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A row did not have the expected shape.
    #[error("could not decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn query(message: impl Into<String>) -> Self {
        StoreError::Query {
            message: message.into(),
        }
    }

    pub fn decode(what: impl Into<String>, message: impl ToString) -> Self {
        StoreError::Decode {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

/// A property-graph database that runs parameterized queries.
///
/// `params` is a JSON object; each returned row is a JSON object keyed by the
/// query's return aliases. Implementations report failures as-is; callers do
/// not retry.
pub trait GraphStore {
    fn run_read_query(&self, query: &str, params: &Record) -> Result<Vec<Record>, StoreError>;

    fn run_write_query(&self, query: &str, params: &Record) -> Result<Vec<Record>, StoreError>;
}

impl<S: GraphStore + ?Sized> GraphStore for &S {
    fn run_read_query(&self, query: &str, params: &Record) -> Result<Vec<Record>, StoreError> {
        (**self).run_read_query(query, params)
    }

    fn run_write_query(&self, query: &str, params: &Record) -> Result<Vec<Record>, StoreError> {
        (**self).run_write_query(query, params)
    }
}
