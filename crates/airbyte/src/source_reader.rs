//! Generic `Reader` implementation over any [`SourceConnector`].

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace, warn};

use reader::{Document, Reader, ReaderError, StreamName};

use crate::connector::SourceConnector;
use crate::handler::{DefaultRecordHandler, RecordHandler};
use crate::protocol::{AirbyteLogMessage, AirbyteMessage, ConfiguredAirbyteCatalog};

/// Reads one Airbyte stream into documents.
///
/// Holds the connector, its configuration, the stream to read, and the record
/// handler. [`Reader::load_data`] performs a read of the configured stream
/// without state; [`AirbyteReader::load_stream`] allows a different stream or
/// an incremental read per call.
pub struct AirbyteReader<C> {
    connector: C,
    config: Value,
    stream: StreamName,
    handler: Arc<dyn RecordHandler>,
    last_state: Mutex<Option<Value>>,
}

impl<C: SourceConnector> AirbyteReader<C> {
    /// Creates a reader for `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if `config` is not a JSON object.
    pub fn new(connector: C, config: Value, stream: StreamName) -> Result<Self, ReaderError> {
        if !config.is_object() {
            return Err(ReaderError::configuration(format!(
                "connector config for '{}' must be a JSON object",
                connector.name()
            )));
        }
        Ok(Self {
            connector,
            config,
            stream,
            handler: Arc::new(DefaultRecordHandler),
            last_state: Mutex::new(None),
        })
    }

    /// Replaces the record → document mapping.
    #[must_use]
    pub fn with_record_handler(mut self, handler: impl RecordHandler + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Returns the stream read by [`Reader::load_data`].
    pub fn stream(&self) -> &StreamName {
        &self.stream
    }

    /// Returns the underlying connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Returns the checkpoint from the most recent successful load, if the
    /// connector emitted one.
    ///
    /// Pass it back as `state` to [`AirbyteReader::load_stream`] to continue
    /// incrementally.
    pub fn last_state(&self) -> Option<Value> {
        self.last_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reads `stream`, optionally resuming from `state`.
    ///
    /// Records belonging to other streams are skipped. Any error trace from
    /// the connector fails the whole load; no documents are returned in that
    /// case and the remembered state is left untouched.
    #[instrument(skip_all, fields(connector = %self.connector.name(), stream = %stream))]
    pub async fn load_stream(
        &self,
        stream: &StreamName,
        state: Option<&Value>,
    ) -> Result<Vec<Document>, ReaderError> {
        let catalog = ConfiguredAirbyteCatalog::for_stream(stream);
        let messages = self.connector.read(&self.config, &catalog, state).await?;

        let mut documents = Vec::new();
        let mut latest_state = None;
        for message in messages {
            match message {
                AirbyteMessage::Record { record } => {
                    if record.stream == stream.as_str() {
                        documents.push(self.handler.to_document(&record));
                    } else {
                        trace!(record_stream = %record.stream, "Skipping record from another stream");
                    }
                }
                AirbyteMessage::State { state: checkpoint } => match checkpoint.to_input_state() {
                    Some(input) => latest_state = Some(input),
                    None => debug!("Ignoring state message without data"),
                },
                AirbyteMessage::Log { log } => forward_log(self.connector.name(), &log),
                AirbyteMessage::Trace { trace } => {
                    if let Some(err) = trace
                        .error
                        .as_ref()
                        .filter(|_| trace.trace_type == "ERROR")
                    {
                        if let Some(internal) = &err.internal_message {
                            debug!(internal_message = %internal, "Connector error details");
                        }
                        let err = err.to_connector_error(self.connector.name());
                        warn!(error = %err, discarded = documents.len(), "Connector reported an error");
                        return Err(err.into());
                    }
                    trace!(trace_type = %trace.trace_type, "Ignoring trace message");
                }
                AirbyteMessage::Other => {}
            }
        }

        if let Some(latest) = latest_state {
            *self
                .last_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(latest);
        }

        info!(documents = documents.len(), "Loaded documents");
        Ok(documents)
    }
}

#[async_trait]
impl<C: SourceConnector> Reader for AirbyteReader<C> {
    async fn load_data(&self) -> Result<Vec<Document>, ReaderError> {
        self.load_stream(&self.stream, None).await
    }
}

fn forward_log(connector: &str, log: &AirbyteLogMessage) {
    match log.level.as_str() {
        "FATAL" | "CRITICAL" | "ERROR" => {
            error!(connector, text = %log.message, "Connector log")
        }
        "WARN" | "WARNING" => warn!(connector, text = %log.message, "Connector log"),
        "INFO" => info!(connector, text = %log.message, "Connector log"),
        _ => debug!(connector, level = %log.level, text = %log.message, "Connector log"),
    }
}
