//! Node and relationship definitions.

mod details;
mod node;
mod relationship;

pub use details::*;
pub use node::*;
pub use relationship::*;
