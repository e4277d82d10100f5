//! Error types for the drift content-tree digest engine.

use thiserror::Error;

/// Policy construction errors.
///
/// A malformed filter pattern fails fast here, at policy build time.
/// Traversal never sees an uncompiled pattern.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid filter pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors raised while reading a content tree.
///
/// All of these are recoverable per-item during a walk: the engine and the
/// serializer log the failure and treat the unreadable item as excluded.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unreadable value for property {property}: {source}")]
    UnreadableValue {
        property: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to enumerate {path}: {reason}")]
    Traversal { path: String, reason: String },

    #[error("tree I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Snapshot serialization errors.
///
/// Unlike tree-read errors, a failure to write the output stream is fatal:
/// the snapshot is truncated and cannot be recovered mid-stream.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write snapshot: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode snapshot value: {0}")]
    Encode(#[from] serde_json::Error),
}
