//! Recursive digest engine.
//!
//! Walks a content tree depth-first looking for aggregate roots (nodes whose
//! type the policy includes), then collapses each aggregate root's entire
//! subtree into one deterministic hex digest. All keys inside an aggregate
//! are relative to the aggregate root, so a relocated subtree with the same
//! local name and shape digests identically.

use crate::digest::property::aggregate_property;
use crate::digest::value::digest_str;
use crate::digest::DigestMap;
use crate::error::TreeError;
use crate::policy::FilterPolicy;
use crate::tree::node::{ContentNode, NodeInfo};
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace, warn};

/// Stateless, reentrant digest generator for one policy.
pub struct DigestEngine<'a> {
    policy: &'a FilterPolicy,
}

impl<'a> DigestEngine<'a> {
    pub fn new(policy: &'a FilterPolicy) -> Self {
        Self { policy }
    }

    /// Walk the tree under `root` and return one digest per aggregate root
    /// found, keyed by absolute path.
    ///
    /// Per-item read failures are logged at `warn` and the item is treated
    /// as excluded; the walk itself never aborts.
    #[instrument(skip(self, root), fields(root = %root.path()))]
    pub fn generate_digests<N: ContentNode>(&self, root: &N) -> DigestMap {
        let mut digests = DigestMap::new();
        let mut chain = vec![NodeInfo::of(root)];
        self.traverse(root, &mut chain, &mut digests);
        debug!(aggregate_count = digests.len(), "Digest walk completed");
        digests
    }

    /// Batch-friendly variant: a missing root (path not resolved by the
    /// host) yields an empty map instead of an error, so sibling roots in
    /// the same request can still succeed.
    pub fn generate_digests_for_root<N: ContentNode>(
        &self,
        path: &str,
        node: Option<&N>,
    ) -> DigestMap {
        match node {
            Some(root) => self.generate_digests(root),
            None => {
                warn!(path, "Root path not found; returning empty digest map");
                DigestMap::new()
            }
        }
    }

    /// Find aggregate roots. Non-candidate nodes are transparent containers:
    /// the walk continues through them looking for nested candidates. At a
    /// candidate the subtree collapses into a single entry and descent stops.
    fn traverse<N: ContentNode>(
        &self,
        node: &N,
        chain: &mut Vec<NodeInfo>,
        digests: &mut DigestMap,
    ) {
        if self.policy.is_subtree_excluded(chain) {
            trace!(path = %node.path(), "Subtree excluded");
            return;
        }

        let info = NodeInfo::of(node);
        // Excluded types are never descended past, so a candidate nested
        // under one stays invisible.
        if self.policy.is_type_excluded(&info) {
            trace!(path = %node.path(), "Type excluded");
            return;
        }

        if self.policy.is_aggregate_candidate(&info) {
            // Name exclusion does not block candidacy; it only suppresses
            // the node's own-properties entry inside digest_subtree.
            if let Some(digest) = self.digest_subtree(node.path(), node.name(), node, chain) {
                trace!(path = %node.path(), digest = %digest, "Aggregate root digested");
                digests.insert(node.path().to_string(), digest);
            }
            return;
        }

        let children = match node.children() {
            Ok(children) => children,
            Err(e) => {
                warn!(path = %node.path(), error = %e, "Skipping unreadable children");
                return;
            }
        };
        for child in children {
            chain.push(NodeInfo::of(&child));
            self.traverse(&child, chain, digests);
            chain.pop();
        }
    }

    /// Collapse `node` and its descendants into one digest, relative to the
    /// aggregate root at `agg_path` / `agg_name`.
    ///
    /// Returns `None` when nothing under the node was eligible for hashing;
    /// an empty aggregate must stay absent rather than collide on a
    /// hash-of-empty-input.
    fn digest_subtree<N: ContentNode>(
        &self,
        agg_path: &str,
        agg_name: &str,
        node: &N,
        chain: &mut Vec<NodeInfo>,
    ) -> Option<String> {
        // Insertion order is significant: own-properties entry first, then
        // children in their deterministic order.
        let mut entries: Vec<(String, String)> = Vec::new();

        if !self.policy.is_name_excluded(chain) {
            if let Some(own) = self.digest_own_properties(agg_path, agg_name, node) {
                entries.push((checksum_key(agg_path, agg_name, node.path()), own));
            }
        } else {
            trace!(path = %node.path(), "Name excluded; skipping own properties");
        }

        let ordered = node.orderable_children();
        let mut sorted_children: BTreeMap<String, String> = BTreeMap::new();
        match node.children() {
            Ok(children) => {
                for child in children {
                    chain.push(NodeInfo::of(&child));
                    let skip = self.policy.is_subtree_excluded(chain)
                        || self.policy.is_type_excluded(&chain[chain.len() - 1]);
                    if !skip {
                        if let Some(digest) =
                            self.digest_subtree(agg_path, agg_name, &child, chain)
                        {
                            let key = checksum_key(agg_path, agg_name, child.path());
                            if ordered {
                                entries.push((key, digest));
                            } else {
                                sorted_children.insert(key, digest);
                            }
                        }
                    }
                    chain.pop();
                }
            }
            Err(e) => {
                warn!(path = %node.path(), error = %e, "Skipping unreadable children");
            }
        }
        entries.extend(sorted_children);

        aggregate_entries(&entries)
    }

    /// Hash the node's own properties into a single signature entry, keyed
    /// per property relative to the aggregate root. Returns `None` when no
    /// property survives filtering, in which case the node contributes no
    /// own-properties entry at all.
    fn digest_own_properties<N: ContentNode>(
        &self,
        agg_path: &str,
        agg_name: &str,
        node: &N,
    ) -> Option<String> {
        let properties = match node.properties() {
            Ok(properties) => properties,
            Err(e) => {
                warn!(path = %node.path(), error = %e, "Skipping unreadable properties");
                return None;
            }
        };

        let mut signatures: BTreeMap<String, String> = BTreeMap::new();
        for property in properties {
            if self.policy.is_property_excluded(&property.name) {
                continue;
            }
            match aggregate_property(&property, self.policy) {
                Ok(signature) => {
                    let property_path = join_property_path(node.path(), &property.name);
                    signatures.insert(
                        checksum_key(agg_path, agg_name, &property_path),
                        signature,
                    );
                }
                Err(e) => {
                    warn!(
                        path = %node.path(),
                        property = %property.name,
                        error = %e,
                        "Skipping unreadable property"
                    );
                }
            }
        }

        let entries: Vec<(String, String)> = signatures.into_iter().collect();
        aggregate_entries(&entries)
    }
}

/// Canonicalize `key=value` pairs in their given order and hash the result.
/// An empty entry list yields no digest.
fn aggregate_entries(entries: &[(String, String)]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let mut data = String::new();
    for (key, value) in entries {
        data.push_str(key);
        data.push('=');
        data.push_str(value);
    }
    Some(digest_str(&data))
}

/// Relative key for an item inside an aggregate: strip the aggregate root's
/// path prefix and prefix the root's own local name, so `/a/b` with
/// descendant `/a/b/c/d` keys as `b/c/d` and the root itself as `b`. The
/// repository root `/` keys itself as the sentinel `/` and its descendants
/// as their path without the leading slash.
fn checksum_key(agg_path: &str, agg_name: &str, path: &str) -> String {
    if agg_path == "/" {
        if path == "/" {
            return "/".to_string();
        }
        return path.trim_start_matches('/').to_string();
    }
    match path.strip_prefix(agg_path) {
        Some(relative) => format!("{agg_name}{relative}"),
        None => path.to_string(),
    }
}

fn join_property_path(node_path: &str, property_name: &str) -> String {
    if node_path == "/" {
        format!("/{property_name}")
    } else {
        format!("{node_path}/{property_name}")
    }
}
