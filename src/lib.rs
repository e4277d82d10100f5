//! Drift: Deterministic Content-Tree Digests
//!
//! Walks an abstract content tree depth-first, applies an
//! inclusion/exclusion policy at each node, and produces a deterministic
//! hex digest per aggregate root, plus a streaming JSON snapshot of the
//! same filtered traversal. Used to detect content drift between
//! environments holding logically-equal trees.
//!
//! The crate holds no state across calls: one policy plus one tree in, one
//! digest map or snapshot out. The host system supplies the tree through
//! the read-only [`ContentNode`] contract.

pub mod digest;
pub mod error;
pub mod policy;
pub mod snapshot;
pub mod tree;

pub use digest::{diff_digests, DigestDelta, DigestEngine, DigestMap};
pub use error::{PolicyError, SnapshotError, TreeError};
pub use policy::{FilterPolicy, FilterPolicyBuilder, PolicySpec};
pub use snapshot::{SnapshotRoot, TreeSerializer};
pub use tree::{BinarySource, ContentNode, MemoryNode, NodeBuilder, Property, PropertyValues, Value};
