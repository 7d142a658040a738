//! Airbyte source adapter.
//!
//! Implements the [`reader::Reader`] trait on top of any Airbyte source
//! connector. The connector is reached through the [`SourceConnector`] port;
//! [`ProcessConnector`] is the production implementation, which runs a source
//! executable and speaks the Airbyte protocol over its stdout.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Protocol framing, catalog construction, process
//! management, and log forwarding all live here. The [`reader`] crate sees only
//! [`reader::Reader`] and [`reader::Document`].
//!
//! ## Message Handling
//!
//! | Message | Effect |
//! |---------|--------|
//! | `RECORD` | Mapped to a document by the configured [`RecordHandler`] |
//! | `STATE` | Remembered; exposed by [`AirbyteReader::last_state`] |
//! | `LOG` | Forwarded to `tracing` at the matching level |
//! | `TRACE` (error) | Fails the load with the mapped [`reader::ConnectorError`] |
//! | anything else | Ignored |
//!
//! Pagination, authentication, and rate limiting belong to the connector.

pub mod connector;
pub mod handler;
pub mod process;
pub mod protocol;
mod source_reader;

pub use connector::SourceConnector;
pub use handler::{DefaultRecordHandler, RecordHandler};
pub use process::ProcessConnector;
pub use protocol::{
    AirbyteErrorTraceMessage, AirbyteLogMessage, AirbyteMessage, AirbyteRecordMessage,
    AirbyteStateMessage, AirbyteTraceMessage, ConfiguredAirbyteCatalog, ConfiguredAirbyteStream,
};
pub use source_reader::AirbyteReader;
