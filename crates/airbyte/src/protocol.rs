//! Airbyte protocol message types.
//!
//! A source connector writes one JSON-encoded [`AirbyteMessage`] per line on
//! stdout. Only the message types a reader acts on are modelled in full; every
//! other type deserialises to [`AirbyteMessage::Other`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use reader::{ConnectorError, StreamName};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One line of connector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirbyteMessage {
    /// A data record belonging to one stream.
    Record {
        /// The record payload.
        record: AirbyteRecordMessage,
    },
    /// A checkpoint that can be fed back for an incremental sync.
    State {
        /// The checkpoint payload.
        state: AirbyteStateMessage,
    },
    /// A log line emitted by the connector.
    Log {
        /// The log payload.
        log: AirbyteLogMessage,
    },
    /// Error reports, estimates, and stream status updates.
    Trace {
        /// The trace payload.
        trace: AirbyteTraceMessage,
    },
    /// `SPEC`, `CATALOG`, `CONNECTION_STATUS`, `CONTROL`, and any future type.
    #[serde(other)]
    Other,
}

/// A single record extracted from the remote platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteRecordMessage {
    /// Name of the stream the record belongs to.
    pub stream: String,
    /// Record payload, normally a JSON object.
    pub data: Value,
    /// Extraction time in milliseconds since the Unix epoch.
    pub emitted_at: i64,
    /// Optional stream namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A sync checkpoint.
///
/// Legacy connectors put the whole state in `data`; current connectors set
/// `type` to `STREAM`, `GLOBAL`, or `LEGACY` and fill the matching field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteStateMessage {
    /// `STREAM`, `GLOBAL`, or `LEGACY`; absent on legacy connectors.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub state_type: Option<String>,
    /// Per-stream state (`type = STREAM`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Value>,
    /// Shared state (`type = GLOBAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<Value>,
    /// Opaque legacy state blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AirbyteStateMessage {
    /// Converts the checkpoint into the form a connector accepts via `--state`.
    ///
    /// Legacy state is passed back as its `data` blob; typed state is passed
    /// back as a one-element array of state messages. A legacy checkpoint
    /// without `data` carries nothing to resume from and yields `None`.
    pub fn to_input_state(&self) -> Option<Value> {
        match self.state_type.as_deref() {
            None | Some("LEGACY") => self.data.clone().filter(|data| !data.is_null()),
            Some(_) => Some(json!([self])),
        }
    }
}

/// A log line emitted by the connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteLogMessage {
    /// `FATAL`, `CRITICAL`, `ERROR`, `WARN`, `INFO`, `DEBUG`, or `TRACE`.
    pub level: String,
    /// The log text.
    pub message: String,
    /// Stack trace attached to error-level logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// A trace message. Only `ERROR` traces influence the outcome of a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteTraceMessage {
    /// `ERROR`, `ESTIMATE`, `STREAM_STATUS`, `ANALYTICS`, ...
    #[serde(rename = "type")]
    pub trace_type: String,
    /// Emission time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub emitted_at: f64,
    /// Error details when `trace_type` is `ERROR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AirbyteErrorTraceMessage>,
}

/// Details of a connector failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteErrorTraceMessage {
    /// User-facing description.
    pub message: String,
    /// Technical description, usually the underlying exception text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_message: Option<String>,
    /// Stack trace of the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// `config_error`, `system_error`, or `transient_error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<String>,
}

impl AirbyteErrorTraceMessage {
    /// Maps the connector's failure classification onto [`ConnectorError`].
    pub fn to_connector_error(&self, connector: &str) -> ConnectorError {
        let connector = connector.to_string();
        let message = self.message.clone();
        match self.failure_type.as_deref() {
            Some("config_error") => ConnectorError::Rejected { connector, message },
            Some("transient_error") => ConnectorError::Transient {
                connector,
                message,
                retry_after: None,
            },
            _ => ConnectorError::Failed { connector, message },
        }
    }
}

/// Returns the first error trace in `messages`, mapped to a [`ConnectorError`].
pub fn first_error(messages: &[AirbyteMessage], connector: &str) -> Option<ConnectorError> {
    messages.iter().find_map(|message| match message {
        AirbyteMessage::Trace { trace } if trace.trace_type == "ERROR" => trace
            .error
            .as_ref()
            .map(|error| error.to_connector_error(connector)),
        _ => None,
    })
}

/// Parses one line of connector stdout.
///
/// Blank lines and lines that are not JSON at all (stray prints from the
/// connector or its libraries) yield `Ok(None)`. A JSON line that does not
/// match the message schema is a protocol error.
pub fn parse_line(line: &str) -> Result<Option<AirbyteMessage>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => return Ok(None),
    };
    serde_json::from_value(value).map(Some)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The catalog handed to the connector's `read` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredAirbyteCatalog {
    /// Streams to read, in order.
    pub streams: Vec<ConfiguredAirbyteStream>,
}

impl ConfiguredAirbyteCatalog {
    /// Builds a catalog that reads one stream incrementally.
    ///
    /// The schema is left empty; the connector supplies its own.
    pub fn for_stream(stream: &StreamName) -> Self {
        Self {
            streams: vec![ConfiguredAirbyteStream {
                stream: json!({
                    "name": stream.as_str(),
                    "json_schema": {},
                    "supported_sync_modes": ["full_refresh", "incremental"],
                }),
                sync_mode: "incremental".to_string(),
                destination_sync_mode: "append".to_string(),
            }],
        }
    }
}

/// One stream entry in a [`ConfiguredAirbyteCatalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredAirbyteStream {
    /// The `AirbyteStream` description (`name`, `json_schema`, sync modes).
    pub stream: Value,
    /// `full_refresh` or `incremental`.
    pub sync_mode: String,
    /// `append`, `overwrite`, or `append_dedup`.
    pub destination_sync_mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_line() {
        let line = r#"{"type":"RECORD","record":{"stream":"tickets","data":{"id":1},"emitted_at":1700000000000}}"#;
        let message = parse_line(line).unwrap().unwrap();
        match message {
            AirbyteMessage::Record { record } => {
                assert_eq!(record.stream, "tickets");
                assert_eq!(record.data, json!({"id": 1}));
                assert_eq!(record.emitted_at, 1_700_000_000_000);
                assert!(record.namespace.is_none());
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ignores_blank_and_non_json_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("Starting source...").unwrap(), None);
        assert_eq!(parse_line("42").unwrap(), None);
    }

    #[test]
    fn test_parse_unknown_type_is_other() {
        let line = r#"{"type":"CONNECTION_STATUS","connectionStatus":{"status":"SUCCEEDED"}}"#;
        assert_eq!(parse_line(line).unwrap(), Some(AirbyteMessage::Other));
    }

    #[test]
    fn test_parse_malformed_record_is_an_error() {
        let line = r#"{"type":"RECORD","record":{"data":{}}}"#;
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn test_legacy_state_passes_back_data() {
        let state = AirbyteStateMessage {
            state_type: None,
            stream: None,
            global: None,
            data: Some(json!({"tickets": {"updated_at": "2024-01-01T00:00:00Z"}})),
        };
        assert_eq!(
            state.to_input_state(),
            Some(json!({"tickets": {"updated_at": "2024-01-01T00:00:00Z"}}))
        );
    }

    #[test]
    fn test_legacy_state_without_data_is_not_a_checkpoint() {
        let untyped = parse_line(r#"{"type":"STATE","state":{}}"#).unwrap();
        let legacy = parse_line(r#"{"type":"STATE","state":{"type":"LEGACY","data":null}}"#).unwrap();
        for message in [untyped, legacy] {
            let Some(AirbyteMessage::State { state }) = message else {
                panic!("expected state");
            };
            assert_eq!(state.to_input_state(), None);
        }
    }

    #[test]
    fn test_stream_state_passes_back_as_array() {
        let line = r#"{"type":"STATE","state":{"type":"STREAM","stream":{"stream_descriptor":{"name":"tickets"},"stream_state":{"cursor":5}}}}"#;
        let Some(AirbyteMessage::State { state }) = parse_line(line).unwrap() else {
            panic!("expected state");
        };
        assert_eq!(
            state.to_input_state(),
            Some(json!([{
                "type": "STREAM",
                "stream": {"stream_descriptor": {"name": "tickets"}, "stream_state": {"cursor": 5}}
            }]))
        );
    }

    #[test]
    fn test_failure_types_map_to_connector_errors() {
        let mut error = AirbyteErrorTraceMessage {
            message: "Unauthorized".into(),
            internal_message: None,
            stack_trace: None,
            failure_type: Some("config_error".into()),
        };
        assert!(matches!(
            error.to_connector_error("src"),
            ConnectorError::Rejected { .. }
        ));

        error.failure_type = Some("transient_error".into());
        assert!(matches!(
            error.to_connector_error("src"),
            ConnectorError::Transient { .. }
        ));

        error.failure_type = None;
        assert!(matches!(
            error.to_connector_error("src"),
            ConnectorError::Failed { .. }
        ));
    }

    #[test]
    fn test_first_error_skips_non_error_traces() {
        let messages = vec![
            AirbyteMessage::Trace {
                trace: AirbyteTraceMessage {
                    trace_type: "STREAM_STATUS".into(),
                    emitted_at: 0.0,
                    error: None,
                },
            },
            AirbyteMessage::Trace {
                trace: AirbyteTraceMessage {
                    trace_type: "ERROR".into(),
                    emitted_at: 0.0,
                    error: Some(AirbyteErrorTraceMessage {
                        message: "boom".into(),
                        internal_message: None,
                        stack_trace: None,
                        failure_type: Some("system_error".into()),
                    }),
                },
            },
        ];
        assert_eq!(
            first_error(&messages, "src"),
            Some(ConnectorError::Failed {
                connector: "src".into(),
                message: "boom".into()
            })
        );
        assert_eq!(first_error(&messages[..1], "src"), None);
    }

    #[test]
    fn test_catalog_for_stream_is_incremental_append() {
        let catalog = ConfiguredAirbyteCatalog::for_stream(&StreamName::new("tickets").unwrap());
        let encoded = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            encoded,
            json!({
                "streams": [{
                    "stream": {
                        "name": "tickets",
                        "json_schema": {},
                        "supported_sync_modes": ["full_refresh", "incremental"]
                    },
                    "sync_mode": "incremental",
                    "destination_sync_mode": "append"
                }]
            })
        );
    }
}
