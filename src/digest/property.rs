//! Property aggregation.
//!
//! Normalizes a property's one-or-many values into a single comma-joined
//! signature of per-value digests. Multi-value order is erased by sorting
//! unless the policy names the property as order-significant; stores
//! frequently return multi-values in nondeterministic order and the digest
//! must not depend on that.

use crate::digest::value::digest_value;
use crate::error::TreeError;
use crate::policy::FilterPolicy;
use crate::tree::node::Property;

/// Build the value signature for one property.
///
/// Each value is digested individually; the token list is sorted
/// lexicographically unless the property is in the policy's
/// `sorted_properties` set; tokens are then joined with `,`. The caller
/// hashes the signature again during node aggregation.
///
/// Any unreadable value fails the whole property; callers treat the
/// property as absent.
pub fn aggregate_property(
    property: &Property,
    policy: &FilterPolicy,
) -> Result<String, TreeError> {
    let mut tokens = Vec::new();
    for value in property.values.as_slice() {
        tokens.push(digest_value(&property.name, value)?);
    }

    if !policy.is_property_sorted(&property.name) {
        tokens.sort();
    }

    Ok(tokens.join(","))
}
