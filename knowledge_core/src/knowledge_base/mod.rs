//! Knowledge Base module - the in-memory graph of learning entities.
//!
//! The graph consists of:
//! - **Nodes**: typed learning entities (concepts, languages, libraries, ...)
//! - **Relationships**: typed, weighted edges between two existing nodes
//! - **Metadata**: descriptive information about the graph as a whole

mod error;
mod graph;
mod snapshot;

pub use error::*;
pub use graph::*;
pub use snapshot::*;
