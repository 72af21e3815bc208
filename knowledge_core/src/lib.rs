//! # Knowledge Core
//!
//! The engine of the learning knowledge graph. This crate works with the
//! entities defined in `knowledge_schema`, holds them in an in-memory graph,
//! and answers structural questions about it.
//!
//! ## Core Components
//!
//! - **knowledge_base**: The graph container, its metadata and snapshots
//! - **traversal**: Adjacency, shortest paths, components and learning paths
//! - **search**: Keyword search with relevance ranking
//! - **stats**: Counts and distributions over the live graph
//! - **interchange**: Bulk payload validation, import and filtered export
//! - **store**: The persistent store contract and a repository built on it
//! - **config**: Store, query and logging settings
//!
//! ## Design Philosophy
//!
//! - **Caller-Owned**: No global graph; callers create and pass the container
//! - **Deterministic**: Ordered maps give stable iteration, ranking and traversal results
//! - **Best-Effort Bulk Work**: Imports record failures per element instead of aborting

pub mod config;
pub mod interchange;
pub mod knowledge_base;
pub mod search;
pub mod stats;
pub mod store;
pub mod traversal;

pub use config::{Config, ConfigError};
pub use interchange::*;
pub use knowledge_base::*;
pub use search::*;
pub use stats::*;
pub use store::*;
pub use traversal::*;

pub use knowledge_schema;
