//! Scalar value model for content-tree properties.
//!
//! Values are a closed tagged variant rather than an open reflective
//! abstraction, so digest and snapshot dispatch stays exhaustive under the
//! compiler. Binary values are never held in memory: they expose a reader
//! that is streamed through the hasher and dropped.

use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

/// Streaming access to a binary value.
///
/// `open` may be called more than once per value; each call returns a fresh
/// reader positioned at the start of the content.
pub trait BinarySource: Send + Sync {
    fn open(&self) -> std::io::Result<Box<dyn Read + '_>>;
}

impl BinarySource for Vec<u8> {
    fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.as_slice())))
    }
}

/// A single scalar property value.
#[derive(Clone)]
pub enum Value {
    String(String),
    Boolean(bool),
    Long(i64),
    Double(f64),
    /// Arbitrary-precision decimal, carried in its canonical string form.
    Decimal(String),
    Timestamp(DateTime<Utc>),
    /// Binary content, streamed on demand.
    Binary(Arc<dyn BinarySource>),
    /// Any host-specific type with no dedicated variant. The raw string is
    /// the host's canonical rendering; the type name is preserved so the
    /// snapshot can report it.
    Other { type_name: String, raw: String },
}

impl Value {
    /// Convenience constructor for in-memory binary values.
    pub fn binary(bytes: Vec<u8>) -> Self {
        Value::Binary(Arc::new(bytes))
    }

    /// Canonical string form for non-binary values.
    ///
    /// Returns `None` for binaries, which have no in-memory string form and
    /// must be streamed through the digester instead.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Long(n) => Some(n.to_string()),
            Value::Double(d) => Some(d.to_string()),
            Value::Decimal(d) => Some(d.clone()),
            Value::Timestamp(t) => Some(t.to_rfc3339()),
            Value::Binary(_) => None,
            Value::Other { raw, .. } => Some(raw.clone()),
        }
    }

    /// Type name as reported in snapshots for non-native JSON scalars.
    pub fn type_name(&self) -> &str {
        match self {
            Value::String(_) => "String",
            Value::Boolean(_) => "Boolean",
            Value::Long(_) => "Long",
            Value::Double(_) => "Double",
            Value::Decimal(_) => "Decimal",
            Value::Timestamp(_) => "Date",
            Value::Binary(_) => "Binary",
            Value::Other { type_name, .. } => type_name,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Value::Double(d) => f.debug_tuple("Double").field(d).finish(),
            Value::Decimal(d) => f.debug_tuple("Decimal").field(d).finish(),
            Value::Timestamp(t) => f.debug_tuple("Timestamp").field(t).finish(),
            Value::Binary(_) => f.write_str("Binary(<stream>)"),
            Value::Other { type_name, raw } => f
                .debug_struct("Other")
                .field("type_name", type_name)
                .field("raw", raw)
                .finish(),
        }
    }
}
