//! # Knowledge Schema
//!
//! Entity definitions for the learning knowledge graph. This crate is the
//! single source of truth for what a node or relationship is and which values
//! its fields may hold. It contains no graph logic.
//!
//! - **kinds**: closed enumerations (node types, relationship types, ...)
//! - **entities**: [`KnowledgeNode`], [`KnowledgeRelationship`] and their
//!   kind-specific details
//! - **record**: validating reads over loosely typed JSON records

pub mod entities;
pub mod error;
pub mod kinds;
pub mod record;

pub use entities::*;
pub use error::*;
pub use kinds::*;
pub use record::{Record, RecordReader};
