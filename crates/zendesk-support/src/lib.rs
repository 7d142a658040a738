//! Zendesk Support reader.
//!
//! Implements the [`reader::Reader`] trait for the Airbyte Zendesk Support
//! source, so helpdesk tickets, users, and other streams can be fed to an
//! indexing pipeline like any other reader.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate owns the Zendesk-specific configuration
//! schema and picks the connector executable. Everything about the Airbyte
//! protocol lives in [`airbyte`]; the Zendesk API itself (pagination,
//! authentication, rate limiting) is the connector's business.
//!
//! ## Example
//!
//! ```ignore
//! use reader::Reader;
//! use zendesk_support::AirbyteZendeskSupportReader;
//!
//! let reader = AirbyteZendeskSupportReader::new(
//!     serde_json::json!({
//!         "subdomain": "acme",
//!         "credentials": {"credentials": "api_token", "email": "agent@acme.com", "api_token": "xxx"}
//!     }),
//!     "tickets",
//! )?;
//! let documents = reader.load_data().await?;
//! ```

pub mod config;
mod support_reader;

pub use config::{is_known_stream, ZendeskCredentials, ZendeskSupportConfig, ZENDESK_SUPPORT_STREAMS};
pub use support_reader::{AirbyteZendeskSupportReader, DEFAULT_PROGRAM};
