//! Filter policy
//!
//! Decides which nodes become aggregate roots, which subtrees and names are
//! excluded from a walk, and which properties are skipped or kept in source
//! order. Immutable once built; all predicates are pure.

pub mod pattern;

use crate::error::PolicyError;
use crate::tree::node::NodeInfo;
use pattern::PathPattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Caller-facing wire form of a filter policy.
///
/// Hosts typically populate this from request parameters or configuration
/// and convert it with [`FilterPolicy::from_spec`], which is where pattern
/// compilation (and validation) happens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySpec {
    pub included_types: Vec<String>,
    pub excluded_types: Vec<String>,
    pub excluded_subtree_patterns: Vec<String>,
    pub excluded_node_name_patterns: Vec<String>,
    pub excluded_properties: Vec<String>,
    pub sorted_properties: Vec<String>,
}

/// Immutable, compiled filter policy for one traversal.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    included_types: BTreeSet<String>,
    excluded_types: BTreeSet<String>,
    excluded_subtrees: Vec<PathPattern>,
    excluded_names: Vec<PathPattern>,
    excluded_properties: BTreeSet<String>,
    sorted_properties: BTreeSet<String>,
}

impl FilterPolicy {
    pub fn builder() -> FilterPolicyBuilder {
        FilterPolicyBuilder::default()
    }

    /// Compile a [`PolicySpec`]. Fails fast on any malformed pattern.
    pub fn from_spec(spec: PolicySpec) -> Result<Self, PolicyError> {
        let mut builder = Self::builder();
        for t in spec.included_types {
            builder = builder.include_type(t);
        }
        for t in spec.excluded_types {
            builder = builder.exclude_type(t);
        }
        for p in spec.excluded_subtree_patterns {
            builder = builder.exclude_subtree(p);
        }
        for p in spec.excluded_node_name_patterns {
            builder = builder.exclude_node_name(p);
        }
        for p in spec.excluded_properties {
            builder = builder.exclude_property(p);
        }
        for p in spec.sorted_properties {
            builder = builder.sorted_property(p);
        }
        builder.build()
    }

    /// Whether a node of this type may become an aggregate root.
    pub fn is_aggregate_candidate(&self, info: &NodeInfo) -> bool {
        self.included_types.contains(&info.primary_type)
            && !self.excluded_types.contains(&info.primary_type)
    }

    /// Whether descent into a node of this type is pruned during aggregation.
    pub fn is_type_excluded(&self, info: &NodeInfo) -> bool {
        self.excluded_types.contains(&info.primary_type)
    }

    /// Whether the node at the end of `chain` roots an excluded subtree.
    pub fn is_subtree_excluded(&self, chain: &[NodeInfo]) -> bool {
        self.excluded_subtrees.iter().any(|p| p.matches(chain))
    }

    /// Whether the node at the end of `chain` is excluded by name: its own
    /// properties are skipped but its children are still walked.
    pub fn is_name_excluded(&self, chain: &[NodeInfo]) -> bool {
        self.excluded_names.iter().any(|p| p.matches(chain))
    }

    pub fn is_property_excluded(&self, name: &str) -> bool {
        self.excluded_properties.contains(name)
    }

    /// Whether a multi-valued property keeps its source value order instead
    /// of being sorted before aggregation.
    pub fn is_property_sorted(&self, name: &str) -> bool {
        self.sorted_properties.contains(name)
    }
}

/// Fluent builder; patterns are compiled (and validated) in [`build`].
///
/// [`build`]: FilterPolicyBuilder::build
#[derive(Debug, Clone, Default)]
pub struct FilterPolicyBuilder {
    included_types: BTreeSet<String>,
    excluded_types: BTreeSet<String>,
    excluded_subtree_patterns: Vec<String>,
    excluded_node_name_patterns: Vec<String>,
    excluded_properties: BTreeSet<String>,
    sorted_properties: BTreeSet<String>,
}

impl FilterPolicyBuilder {
    pub fn include_type(mut self, primary_type: impl Into<String>) -> Self {
        self.included_types.insert(primary_type.into());
        self
    }

    pub fn exclude_type(mut self, primary_type: impl Into<String>) -> Self {
        self.excluded_types.insert(primary_type.into());
        self
    }

    pub fn exclude_subtree(mut self, pattern: impl Into<String>) -> Self {
        self.excluded_subtree_patterns.push(pattern.into());
        self
    }

    pub fn exclude_node_name(mut self, pattern: impl Into<String>) -> Self {
        self.excluded_node_name_patterns.push(pattern.into());
        self
    }

    pub fn exclude_property(mut self, name: impl Into<String>) -> Self {
        self.excluded_properties.insert(name.into());
        self
    }

    pub fn sorted_property(mut self, name: impl Into<String>) -> Self {
        self.sorted_properties.insert(name.into());
        self
    }

    pub fn build(self) -> Result<FilterPolicy, PolicyError> {
        let compile_all = |patterns: Vec<String>| -> Result<Vec<PathPattern>, PolicyError> {
            patterns
                .iter()
                .map(|p| PathPattern::compile(p))
                .collect()
        };

        Ok(FilterPolicy {
            included_types: self.included_types,
            excluded_types: self.excluded_types,
            excluded_subtrees: compile_all(self.excluded_subtree_patterns)?,
            excluded_names: compile_all(self.excluded_node_name_patterns)?,
            excluded_properties: self.excluded_properties,
            sorted_properties: self.sorted_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, primary_type: &str) -> NodeInfo {
        NodeInfo {
            name: name.to_string(),
            primary_type: primary_type.to_string(),
        }
    }

    #[test]
    fn test_aggregate_candidacy_requires_inclusion_without_exclusion() {
        let policy = FilterPolicy::builder()
            .include_type("app:Component")
            .include_type("app:Page")
            .exclude_type("app:Page")
            .build()
            .unwrap();

        assert!(policy.is_aggregate_candidate(&info("n", "app:Component")));
        // Excluded wins over included.
        assert!(!policy.is_aggregate_candidate(&info("n", "app:Page")));
        assert!(!policy.is_aggregate_candidate(&info("n", "nt:folder")));
    }

    #[test]
    fn test_build_fails_fast_on_malformed_pattern() {
        let err = FilterPolicy::builder()
            .exclude_subtree("[oops")
            .build()
            .unwrap_err();
        let PolicyError::InvalidPattern { pattern, .. } = err;
        assert_eq!(pattern, "[oops");
    }

    #[test]
    fn test_from_spec_round_trip() {
        let json = r#"{
            "included_types": ["app:Component"],
            "excluded_types": ["rep:ACL"],
            "excluded_subtree_patterns": ["rep:policy"],
            "excluded_node_name_patterns": ["oak:index"],
            "excluded_properties": ["jcr:created"],
            "sorted_properties": ["items"]
        }"#;
        let spec: PolicySpec = serde_json::from_str(json).unwrap();
        let policy = FilterPolicy::from_spec(spec).unwrap();

        assert!(policy.is_aggregate_candidate(&info("n", "app:Component")));
        assert!(policy.is_type_excluded(&info("n", "rep:ACL")));
        assert!(policy.is_subtree_excluded(&[info("rep:policy", "rep:ACL")]));
        assert!(policy.is_name_excluded(&[info("oak:index", "nt:unstructured")]));
        assert!(policy.is_property_excluded("jcr:created"));
        assert!(policy.is_property_sorted("items"));
    }

    #[test]
    fn test_spec_fields_all_default_empty() {
        let spec: PolicySpec = serde_json::from_str("{}").unwrap();
        let policy = FilterPolicy::from_spec(spec).unwrap();
        assert!(!policy.is_aggregate_candidate(&info("n", "anything")));
        assert!(!policy.is_subtree_excluded(&[info("n", "anything")]));
        assert!(!policy.is_property_excluded("p"));
    }
}
