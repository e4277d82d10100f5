//! Tree snapshots
//!
//! Streaming JSON rendering of a filtered content tree, sharing the digest
//! engine's filtering and ordering rules.

pub mod serializer;
pub mod writer;

pub use serializer::{SnapshotRoot, TreeSerializer};
pub use writer::JsonStreamWriter;
