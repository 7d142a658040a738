//! Newtype identifiers.
//!
//! A document id and a stream name are both strings under the hood; wrapping
//! them keeps a caller from passing one where the other is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Identifies a document record.
    ///
    /// Taken from the upstream record's own `id` when it has one; otherwise a
    /// random UUID is generated with [`DocumentId::new_random`].
    DocumentId
}

impl DocumentId {
    /// Generates a new random document identifier (UUID v4, hyphenated).
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

string_id! {
    /// Names a connector stream (e.g. `"tickets"`, `"users"`).
    ///
    /// The connector decides which stream names it supports; readers pass the
    /// name through without checking it.
    StreamName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert!(DocumentId::new("").is_none());
        assert!(StreamName::new(String::new()).is_none());
    }

    #[test]
    fn test_identifier_display_matches_value() {
        let stream = StreamName::new("tickets").unwrap();
        assert_eq!(stream.to_string(), "tickets");
        assert_eq!(stream.as_str(), "tickets");
    }

    #[test]
    fn test_random_document_ids_are_distinct_uuids() {
        let a = DocumentId::new_random();
        let b = DocumentId::new_random();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }
}
