//! Document reader domain.
//!
//! This crate contains the document record model, the newtype identifiers, the
//! [`Reader`] port, and the error taxonomy shared by every reader adapter.
//! Infrastructure crates implement [`Reader`]; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* a reader yields; infrastructure crates define *how* the
//! records are extracted from a remote platform.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`DocumentId`, `StreamName`) |
//! | [`document`] | Document records and scalar metadata |
//! | [`errors`] | `ReaderError`, `ConnectorError`, and `RetryPolicy` |
//! | [`reader`] | The `Reader` capability |

pub mod document;
pub mod errors;
pub mod identifiers;
pub mod reader;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use document::{Document, Metadata, MetadataValue};
pub use errors::{ConnectorError, ReaderError, RetryPolicy};
pub use identifiers::{DocumentId, StreamName};
pub use reader::Reader;
