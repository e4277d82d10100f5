//! Tree snapshot serializer.
//!
//! Renders the same filtered traversal the digest engine performs, but as a
//! nested JSON structure instead of a digest, and without stopping at
//! aggregate roots: every non-excluded node and property is emitted. Binary
//! values always appear as their hex digest, never as raw bytes, which keeps
//! snapshots small and line-diffable.

use crate::digest::value::digest_value;
use crate::error::{SnapshotError, TreeError};
use crate::policy::FilterPolicy;
use crate::snapshot::writer::JsonStreamWriter;
use crate::tree::node::{ContentNode, NodeInfo, Property, PropertyValues};
use crate::tree::value::Value;
use std::io::Write;
use tracing::{instrument, warn};

/// One requested snapshot root. A `None` node means the host could not
/// resolve the path; the snapshot carries an explicit error marker for it so
/// sibling roots still serialize.
pub struct SnapshotRoot<'a, N> {
    pub path: &'a str,
    pub node: Option<&'a N>,
}

impl<'a, N> SnapshotRoot<'a, N> {
    pub fn found(path: &'a str, node: &'a N) -> Self {
        Self {
            path,
            node: Some(node),
        }
    }

    pub fn missing(path: &'a str) -> Self {
        Self { path, node: None }
    }
}

/// Stateless, reentrant snapshot serializer for one policy.
pub struct TreeSerializer<'a> {
    policy: &'a FilterPolicy,
}

impl<'a> TreeSerializer<'a> {
    pub fn new(policy: &'a FilterPolicy) -> Self {
        Self { policy }
    }

    /// Serialize the requested roots as one JSON object keyed by root path.
    ///
    /// Tree-read failures are logged and the affected item skipped, same as
    /// the digest engine; output write failures are fatal.
    #[instrument(skip_all, fields(root_count = roots.len()))]
    pub fn serialize<N: ContentNode, W: Write>(
        &self,
        roots: &[SnapshotRoot<'_, N>],
        out: W,
    ) -> Result<(), SnapshotError> {
        let mut writer = JsonStreamWriter::new(out);
        writer.begin_object()?;
        for root in roots {
            match root.node {
                None => {
                    warn!(path = root.path, "Snapshot root not found");
                    writer.key(root.path)?;
                    writer.scalar(&format!("ERROR: {} not found", root.path))?;
                }
                Some(node) => {
                    let mut chain = vec![NodeInfo::of(node)];
                    if self.policy.is_subtree_excluded(&chain) {
                        continue;
                    }
                    writer.key(root.path)?;
                    self.write_node(node, &mut chain, &mut writer)?;
                }
            }
        }
        writer.end_object()?;
        writer.finish()
    }

    fn write_node<N: ContentNode, W: Write>(
        &self,
        node: &N,
        chain: &mut Vec<NodeInfo>,
        writer: &mut JsonStreamWriter<W>,
    ) -> Result<(), SnapshotError> {
        writer.begin_object()?;

        // A name-excluded node keeps its place in the structure but exposes
        // no properties of its own.
        if !self.policy.is_name_excluded(chain) {
            match node.properties() {
                Ok(mut properties) => {
                    properties.sort_by(|a, b| a.name.cmp(&b.name));
                    for property in &properties {
                        if self.policy.is_property_excluded(&property.name) {
                            continue;
                        }
                        self.write_property(node.path(), property, writer)?;
                    }
                }
                Err(e) => {
                    warn!(path = %node.path(), error = %e, "Skipping unreadable properties");
                }
            }
        }

        match node.children() {
            Ok(mut children) => {
                if !node.orderable_children() {
                    children.sort_by(|a, b| a.name().cmp(b.name()));
                }
                for child in children {
                    chain.push(NodeInfo::of(&child));
                    let skip = self.policy.is_subtree_excluded(chain)
                        || self.policy.is_type_excluded(&chain[chain.len() - 1]);
                    if !skip {
                        writer.key(child.name())?;
                        self.write_node(&child, chain, writer)?;
                    }
                    chain.pop();
                }
            }
            Err(e) => {
                warn!(path = %node.path(), error = %e, "Skipping unreadable children");
            }
        }

        writer.end_object()
    }

    /// Emit one property. All values are rendered up front so an unreadable
    /// value skips the whole property before anything has been written.
    fn write_property<W: Write>(
        &self,
        node_path: &str,
        property: &Property,
        writer: &mut JsonStreamWriter<W>,
    ) -> Result<(), SnapshotError> {
        let rendered: Result<Vec<Rendered>, TreeError> = property
            .values
            .as_slice()
            .iter()
            .map(|v| render_value(&property.name, v))
            .collect();
        let mut rendered = match rendered {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(
                    path = node_path,
                    property = %property.name,
                    error = %e,
                    "Skipping unreadable property"
                );
                return Ok(());
            }
        };

        writer.key(&property.name)?;
        match &property.values {
            PropertyValues::Single(_) => write_scalar(&rendered[0], writer),
            PropertyValues::Multi(_) => {
                if !self.policy.is_property_sorted(&property.name) {
                    rendered.sort_by_key(|v| v.sort_key());
                }
                writer.begin_array()?;
                for value in &rendered {
                    write_scalar(value, writer)?;
                }
                writer.end_array()
            }
        }
    }
}

/// A value reduced to its JSON form. Rendering is separated from writing so
/// multi-values can be sorted (binaries by digest) before emission.
enum Rendered {
    Str(String),
    Bool(bool),
    Long(i64),
    Double(f64),
    /// Timestamp, decimal, and host-specific values keep their type name
    /// alongside the canonical string, since plain stringification would
    /// lose it.
    Typed { type_name: String, val: String },
}

impl Rendered {
    /// Canonical comparison form; binaries have already been reduced to
    /// their digest by this point.
    fn sort_key(&self) -> String {
        match self {
            Rendered::Str(s) => s.clone(),
            Rendered::Bool(b) => b.to_string(),
            Rendered::Long(n) => n.to_string(),
            Rendered::Double(d) => d.to_string(),
            Rendered::Typed { val, .. } => val.clone(),
        }
    }
}

fn render_value(property: &str, value: &Value) -> Result<Rendered, TreeError> {
    Ok(match value {
        Value::String(s) => Rendered::Str(s.clone()),
        Value::Boolean(b) => Rendered::Bool(*b),
        Value::Long(n) => Rendered::Long(*n),
        Value::Double(d) => Rendered::Double(*d),
        Value::Binary(_) => Rendered::Str(digest_value(property, value)?),
        Value::Timestamp(_) | Value::Decimal(_) | Value::Other { .. } => Rendered::Typed {
            type_name: value.type_name().to_string(),
            val: value.canonical_string().unwrap_or_default(),
        },
    })
}

fn write_scalar<W: Write>(
    value: &Rendered,
    writer: &mut JsonStreamWriter<W>,
) -> Result<(), SnapshotError> {
    match value {
        Rendered::Str(s) => writer.scalar(s),
        Rendered::Bool(b) => writer.scalar(b),
        Rendered::Long(n) => writer.scalar(n),
        Rendered::Double(d) => writer.scalar(d),
        Rendered::Typed { type_name, val } => {
            writer.begin_object()?;
            writer.key("type")?;
            writer.scalar(type_name)?;
            writer.key("val")?;
            writer.scalar(val)?;
            writer.end_object()
        }
    }
}
