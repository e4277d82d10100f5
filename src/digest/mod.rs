//! Content digests
//!
//! Deterministic per-aggregate-root digests over a filtered content tree,
//! plus a diff helper over two digest maps.

pub mod engine;
pub mod property;
pub mod value;

pub use engine::DigestEngine;

use std::collections::BTreeMap;

/// Digest output: absolute path of each aggregate root to its hex digest.
pub type DigestMap = BTreeMap<String, String>;

/// One difference between two digest maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestDelta {
    /// Present only on the right side.
    Added { path: String },
    /// Present only on the left side.
    Removed { path: String },
    /// Present on both sides with different digests.
    Changed {
        path: String,
        left: String,
        right: String,
    },
}

impl DigestDelta {
    pub fn path(&self) -> &str {
        match self {
            DigestDelta::Added { path }
            | DigestDelta::Removed { path }
            | DigestDelta::Changed { path, .. } => path,
        }
    }
}

/// Compare two digest maps and report drift, ordered by path.
pub fn diff_digests(left: &DigestMap, right: &DigestMap) -> Vec<DigestDelta> {
    let mut deltas = Vec::new();
    for (path, left_digest) in left {
        match right.get(path) {
            None => deltas.push(DigestDelta::Removed { path: path.clone() }),
            Some(right_digest) if right_digest != left_digest => {
                deltas.push(DigestDelta::Changed {
                    path: path.clone(),
                    left: left_digest.clone(),
                    right: right_digest.clone(),
                });
            }
            Some(_) => {}
        }
    }
    for path in right.keys() {
        if !left.contains_key(path) {
            deltas.push(DigestDelta::Added { path: path.clone() });
        }
    }
    deltas.sort_by(|a, b| a.path().cmp(b.path()));
    deltas
}
