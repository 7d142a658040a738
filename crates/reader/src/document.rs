//! Document records.
//!
//! A [`Document`] is the normalised unit consumed by downstream indexing: text
//! content plus a flat map of scalar metadata. Documents are built once by a
//! reader and never mutated afterwards; fields are private and exposed through
//! accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DocumentId;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// A scalar metadata value.
///
/// Nested objects and arrays are not representable; readers flatten or drop
/// them when building metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    String(String),
}

impl MetadataValue {
    /// Converts a JSON value into a scalar, returning `None` for `null`,
    /// arrays, objects, and unsigned integers that do not fit in `i64`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| if n.is_u64() { None } else { n.as_f64().map(Self::Float) }),
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Document metadata: string keys to scalar values, ordered by key.
pub type Metadata = BTreeMap<String, MetadataValue>;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document record produced by a [`crate::Reader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    content: String,
    metadata: Metadata,
}

impl Document {
    /// Creates a document with a freshly generated id and no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new_random(),
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Replaces the generated id.
    #[must_use]
    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = id;
        self
    }

    /// Replaces the metadata map.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the document id.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Returns the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the metadata map.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Looks up a single metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }
}
