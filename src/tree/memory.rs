//! In-memory content tree.
//!
//! `NodeBuilder` assembles a tree by name; `build_root` assigns absolute
//! paths top-down and freezes the result into shared [`MemoryNode`] handles.
//! Used by tests and by callers that have no live host tree.

use crate::error::TreeError;
use crate::tree::node::{ContentNode, Property, PropertyValues};
use crate::tree::value::Value;
use std::sync::Arc;

#[derive(Debug)]
struct NodeData {
    path: String,
    name: String,
    primary_type: String,
    orderable: bool,
    properties: Vec<Property>,
    children: Vec<MemoryNode>,
}

/// Cheap shared handle to an immutable in-memory node.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    data: Arc<NodeData>,
}

impl MemoryNode {
    /// Find a descendant by absolute path. Returns `None` when the path is
    /// outside this subtree.
    pub fn find(&self, path: &str) -> Option<MemoryNode> {
        if self.data.path == path {
            return Some(self.clone());
        }
        let prefix = if self.data.path == "/" {
            "/".to_string()
        } else {
            format!("{}/", self.data.path)
        };
        if !path.starts_with(&prefix) {
            return None;
        }
        for child in &self.data.children {
            if let Some(found) = child.find(path) {
                return Some(found);
            }
        }
        None
    }
}

impl ContentNode for MemoryNode {
    fn path(&self) -> &str {
        &self.data.path
    }

    fn name(&self) -> &str {
        &self.data.name
    }

    fn primary_type(&self) -> &str {
        &self.data.primary_type
    }

    fn orderable_children(&self) -> bool {
        self.data.orderable
    }

    fn children(&self) -> Result<Vec<MemoryNode>, TreeError> {
        Ok(self.data.children.clone())
    }

    fn properties(&self) -> Result<Vec<Property>, TreeError> {
        Ok(self.data.properties.clone())
    }
}

/// Builder for in-memory trees. Paths are assigned at build time, so a
/// subtree description can be attached under any parent.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    name: String,
    primary_type: String,
    orderable: bool,
    properties: Vec<Property>,
    children: Vec<NodeBuilder>,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_type: primary_type.into(),
            orderable: false,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Mark this node's children as having a stable caller-defined order.
    pub fn orderable(mut self) -> Self {
        self.orderable = true;
        self
    }

    /// Add a single-valued property.
    pub fn prop(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.push(Property {
            name: name.into(),
            values: PropertyValues::Single(value),
        });
        self
    }

    /// Add a multi-valued property.
    pub fn multi_prop(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            values: PropertyValues::Multi(values),
        });
        self
    }

    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Freeze the tree with this node mounted directly under the root,
    /// i.e. at `/<name>`.
    pub fn build_root(self) -> MemoryNode {
        self.build_at("")
    }

    /// Freeze the tree with this node mounted under `parent_path`.
    ///
    /// An empty name with an empty parent yields the repository root `/`.
    pub fn build_at(self, parent_path: &str) -> MemoryNode {
        let path = if self.name.is_empty() && parent_path.is_empty() {
            "/".to_string()
        } else if parent_path == "/" || parent_path.is_empty() {
            format!("/{}", self.name)
        } else {
            format!("{}/{}", parent_path, self.name)
        };
        let children = self
            .children
            .into_iter()
            .map(|c| c.build_at(&path))
            .collect();
        MemoryNode {
            data: Arc::new(NodeData {
                path,
                name: self.name,
                primary_type: self.primary_type,
                orderable: self.orderable,
                properties: self.properties,
                children,
            }),
        }
    }
}
