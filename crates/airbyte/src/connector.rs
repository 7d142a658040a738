//! The `SourceConnector` port.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use reader::ConnectorError;

use crate::protocol::{AirbyteMessage, ConfiguredAirbyteCatalog};

/// Anything that can run an Airbyte source `read` and hand back its messages.
///
/// Implementations own every detail of talking to the remote platform. They
/// return the complete message sequence in emission order, or an error if the
/// read could not be completed.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Returns the connector name used in logs and errors.
    fn name(&self) -> &str;

    /// Runs a read of the streams in `catalog`.
    ///
    /// # Arguments
    /// * `config` - Connector configuration (credentials, subdomain, ...)
    /// * `catalog` - Streams to read and their sync modes
    /// * `state` - Checkpoint from a previous read, for incremental syncs
    async fn read(
        &self,
        config: &Value,
        catalog: &ConfiguredAirbyteCatalog,
        state: Option<&Value>,
    ) -> Result<Vec<AirbyteMessage>, ConnectorError>;
}

#[async_trait]
impl<C: SourceConnector + ?Sized> SourceConnector for Arc<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn read(
        &self,
        config: &Value,
        catalog: &ConfiguredAirbyteCatalog,
        state: Option<&Value>,
    ) -> Result<Vec<AirbyteMessage>, ConnectorError> {
        (**self).read(config, catalog, state).await
    }
}
