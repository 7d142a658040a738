//! Mapping from Airbyte records to documents.

use serde_json::Value;

use reader::{Document, DocumentId, Metadata, MetadataValue};

use crate::protocol::AirbyteRecordMessage;

/// Converts one connector record into one document.
///
/// Any `Fn(&AirbyteRecordMessage) -> Document` closure is a handler, so callers
/// can customise the mapping without defining a type.
pub trait RecordHandler: Send + Sync {
    /// Builds the document for `record`.
    fn to_document(&self, record: &AirbyteRecordMessage) -> Document;
}

impl<F> RecordHandler for F
where
    F: Fn(&AirbyteRecordMessage) -> Document + Send + Sync,
{
    fn to_document(&self, record: &AirbyteRecordMessage) -> Document {
        self(record)
    }
}

/// The mapping used when no handler is configured.
///
/// - content: the record's `data`, serialised as compact JSON
/// - metadata: every scalar top-level field of `data`
/// - id: `data.id` when it is a string or number, otherwise a random UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecordHandler;

impl RecordHandler for DefaultRecordHandler {
    fn to_document(&self, record: &AirbyteRecordMessage) -> Document {
        let metadata: Metadata = match &record.data {
            Value::Object(fields) => fields
                .iter()
                .filter_map(|(key, value)| {
                    MetadataValue::from_json(value).map(|scalar| (key.clone(), scalar))
                })
                .collect(),
            _ => Metadata::new(),
        };

        let id = match record.data.get("id") {
            Some(Value::String(s)) => DocumentId::new(s.as_str()),
            Some(Value::Number(n)) => DocumentId::new(n.to_string()),
            _ => None,
        };

        let document = Document::new(record.data.to_string()).with_metadata(metadata);
        match id {
            Some(id) => document.with_id(id),
            None => document,
        }
    }
}
