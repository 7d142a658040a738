//! The Zendesk Support reader.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use airbyte::{AirbyteReader, ProcessConnector, RecordHandler, SourceConnector};
use reader::{Document, Reader, ReaderError, StreamName};

use crate::config::{is_known_stream, ZendeskSupportConfig};

/// Executable installed by the Airbyte Zendesk Support source package.
pub const DEFAULT_PROGRAM: &str = "source-zendesk-support";

/// Reads a Zendesk Support stream (tickets, users, ...) as documents.
///
/// Configuration is validated when the reader is built, so missing or
/// malformed credentials fail before the connector is ever invoked.
pub struct AirbyteZendeskSupportReader<C = ProcessConnector> {
    inner: AirbyteReader<C>,
    config: ZendeskSupportConfig,
}

impl AirbyteZendeskSupportReader<ProcessConnector> {
    /// Creates a reader that runs the installed [`DEFAULT_PROGRAM`].
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if `config` is invalid or
    /// `stream` is empty.
    pub fn new(config: Value, stream: &str) -> Result<Self, ReaderError> {
        Self::with_connector(config, stream, ProcessConnector::new(DEFAULT_PROGRAM))
    }
}

impl<C: SourceConnector> AirbyteZendeskSupportReader<C> {
    /// Creates a reader on top of a caller-supplied connector
    /// (a container runner, a different executable, a test double).
    pub fn with_connector(config: Value, stream: &str, connector: C) -> Result<Self, ReaderError> {
        let config = ZendeskSupportConfig::from_value(config)?;
        let stream = StreamName::new(stream)
            .ok_or_else(|| ReaderError::configuration("Stream name must not be empty"))?;
        if !is_known_stream(stream.as_str()) {
            warn!(stream = %stream, "Stream is not a known Zendesk Support stream; passing it through");
        }

        let inner = AirbyteReader::new(connector, config.to_value()?, stream)?;
        debug!(
            subdomain = %config.subdomain,
            stream = %inner.stream(),
            connector = %inner.connector().name(),
            "Created Zendesk Support reader"
        );
        Ok(Self { inner, config })
    }

    /// Replaces the record → document mapping.
    #[must_use]
    pub fn with_record_handler(mut self, handler: impl RecordHandler + 'static) -> Self {
        self.inner = self.inner.with_record_handler(handler);
        self
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &ZendeskSupportConfig {
        &self.config
    }

    /// Returns the stream read by [`Reader::load_data`].
    pub fn stream(&self) -> &StreamName {
        self.inner.stream()
    }

    /// Returns the checkpoint from the most recent successful load.
    pub fn last_state(&self) -> Option<Value> {
        self.inner.last_state()
    }

    /// Reads `stream`, optionally resuming from a previous [`last_state`](Self::last_state).
    pub async fn load_stream(
        &self,
        stream: &StreamName,
        state: Option<&Value>,
    ) -> Result<Vec<Document>, ReaderError> {
        self.inner.load_stream(stream, state).await
    }
}

#[async_trait]
impl<C: SourceConnector> Reader for AirbyteZendeskSupportReader<C> {
    async fn load_data(&self) -> Result<Vec<Document>, ReaderError> {
        self.inner.load_data().await
    }
}
