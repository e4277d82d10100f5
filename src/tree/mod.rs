//! Abstract content tree
//!
//! The read-only node contract the digest engine and snapshot serializer
//! walk, the scalar value model, and an in-memory implementation.

pub mod memory;
pub mod node;
pub mod value;

pub use memory::{MemoryNode, NodeBuilder};
pub use node::{ContentNode, NodeInfo, Property, PropertyValues};
pub use value::{BinarySource, Value};
