//! Path-fragment matcher for exclusion rules.
//!
//! A pattern is a `/`-delimited sequence of fragments matched right-to-left
//! against a node's ancestor chain, starting at the node itself. A fragment
//! is either a literal local name or `[typeName]`, which matches the
//! ancestor's primary type and ignores its name. All fragments must match
//! consecutive ancestors for the pattern to match, so `rep:policy` excludes
//! any node with that name anywhere, while `[app:Page]/foo` excludes a node
//! named `foo` directly under a node of type `app:Page`.

use crate::error::PolicyError;
use crate::tree::node::NodeInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    /// Matches the ancestor's local name exactly.
    Name(String),
    /// Matches the ancestor's primary type, name ignored.
    Type(String),
}

impl Fragment {
    fn matches(&self, info: &NodeInfo) -> bool {
        match self {
            Fragment::Name(name) => info.name == *name,
            Fragment::Type(type_name) => info.primary_type == *type_name,
        }
    }
}

/// A compiled path-fragment pattern. Compilation happens once at policy
/// construction; matching is pure and allocation-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    fragments: Vec<Fragment>,
}

impl PathPattern {
    /// Compile a pattern, rejecting malformed fragments up front.
    pub fn compile(pattern: &str) -> Result<Self, PolicyError> {
        let invalid = |reason: &str| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = pattern.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        let mut fragments = Vec::new();
        for raw in trimmed.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty fragment"));
            }
            if let Some(inner) = raw.strip_prefix('[') {
                let Some(type_name) = inner.strip_suffix(']') else {
                    return Err(invalid("unmatched '[' in type fragment"));
                };
                if type_name.is_empty() {
                    return Err(invalid("empty type fragment"));
                }
                fragments.push(Fragment::Type(type_name.to_string()));
            } else if raw.contains('[') || raw.contains(']') {
                return Err(invalid("'[' and ']' are only valid delimiting a type fragment"));
            } else {
                fragments.push(Fragment::Name(raw.to_string()));
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            fragments,
        })
    }

    /// Original pattern text, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match against an ancestor chain ordered root-first and ending at the
    /// node under test. The rightmost fragment is checked against the node
    /// itself, each preceding fragment against the next ancestor up. A
    /// pattern longer than the known chain does not match.
    pub fn matches(&self, chain: &[NodeInfo]) -> bool {
        if self.fragments.len() > chain.len() {
            return false;
        }
        self.fragments
            .iter()
            .rev()
            .zip(chain.iter().rev())
            .all(|(fragment, info)| fragment.matches(info))
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
    fn test_single_name_fragment_matches_anywhere() {
        let p = PathPattern::compile("rep:policy").unwrap();
        assert!(p.matches(&[info("content", "nt:folder"), info("rep:policy", "rep:ACL")]));
        assert!(p.matches(&[info("rep:policy", "rep:ACL")]));
        assert!(!p.matches(&[info("content", "nt:folder"), info("other", "rep:ACL")]));
    }

    #[test]
    fn test_typed_parent_fragment() {
        let p = PathPattern::compile("[app:Page]/foo").unwrap();
        assert!(p.matches(&[
            info("content", "nt:folder"),
            info("page", "app:Page"),
            info("foo", "nt:unstructured"),
        ]));
        // Parent type mismatch.
        assert!(!p.matches(&[
            info("content", "nt:folder"),
            info("page", "nt:folder"),
            info("foo", "nt:unstructured"),
        ]));
        // Fragments must be consecutive: app:Page grandparent does not count.
        assert!(!p.matches(&[
            info("page", "app:Page"),
            info("mid", "nt:folder"),
            info("foo", "nt:unstructured"),
        ]));
    }

    #[test]
    fn test_pattern_longer_than_chain_does_not_match() {
        let p = PathPattern::compile("a/b/c").unwrap();
        assert!(!p.matches(&[info("b", "t"), info("c", "t")]));
    }

    #[test]
    fn test_leading_slash_is_ignored() {
        let p = PathPattern::compile("/var/audit").unwrap();
        assert!(p.matches(&[info("var", "nt:folder"), info("audit", "nt:folder")]));
    }

    #[test]
    fn test_compile_rejects_malformed_patterns() {
        assert!(PathPattern::compile("").is_err());
        assert!(PathPattern::compile("   ").is_err());
        assert!(PathPattern::compile("a//b").is_err());
        assert!(PathPattern::compile("[unclosed").is_err());
        assert!(PathPattern::compile("[]").is_err());
        assert!(PathPattern::compile("a[b]c").is_err());
    }

    #[test]
    fn test_all_type_fragments() {
        let p = PathPattern::compile("[nt:folder]/[rep:ACL]").unwrap();
        assert!(p.matches(&[info("anything", "nt:folder"), info("whatever", "rep:ACL")]));
    }
}
