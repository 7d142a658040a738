//! Error and retry-policy types for readers.
//!
//! [`ReaderError`] is what every [`crate::Reader`] returns. It separates
//! problems the caller can fix before anything runs (configuration) from
//! failures raised by the external connector, which are carried unchanged in
//! [`ConnectorError`].
//!
//! [`RetryPolicy`] is advisory: readers never retry on their own, but a caller
//! that wants to can ask a [`ConnectorError`] whether a retry makes sense.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable` errors: network failures, rate-limit responses, anything the
///   connector itself labels transient.
/// - `NonRetryable` errors: rejected credentials, malformed protocol output,
///   connector crashes, invalid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means the caller
        /// applies its own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried without human intervention.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Connector errors
// ---------------------------------------------------------------------------

/// Failures originating from the external connector.
///
/// Produced by connector implementations and propagated through
/// [`ReaderError::Connector`] without being wrapped or retried.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ConnectorError {
    /// The connector could not be launched or reached at all.
    #[error("Connector '{connector}' unavailable: {message}")]
    Unavailable {
        /// Connector name used in logs (e.g. the executable).
        connector: String,
        /// What went wrong while starting it.
        message: String,
    },

    /// The connector refused its configuration, typically an authentication
    /// failure against the remote platform.
    #[error("Connector '{connector}' rejected its configuration: {message}")]
    Rejected {
        /// Connector name used in logs.
        connector: String,
        /// User-facing message reported by the connector.
        message: String,
    },

    /// A transient failure (network, rate limit) reported by the connector.
    #[error("Connector '{connector}' hit a transient failure: {message}")]
    Transient {
        /// Connector name used in logs.
        connector: String,
        /// User-facing message reported by the connector.
        message: String,
        /// Back-off hint, when the connector provided one.
        retry_after: Option<Duration>,
    },

    /// The connector failed for any other reason (internal error, non-zero
    /// exit status).
    #[error("Connector '{connector}' failed: {message}")]
    Failed {
        /// Connector name used in logs.
        connector: String,
        /// User-facing message reported by the connector.
        message: String,
    },

    /// The connector produced output that does not match the expected shape.
    #[error("Connector '{connector}' produced malformed output: {message}")]
    Protocol {
        /// Connector name used in logs.
        connector: String,
        /// Description of the mismatch.
        message: String,
    },
}

impl ConnectorError {
    /// Returns the name of the connector that raised this error.
    pub fn connector(&self) -> &str {
        match self {
            Self::Unavailable { connector, .. }
            | Self::Rejected { connector, .. }
            | Self::Transient { connector, .. }
            | Self::Failed { connector, .. }
            | Self::Protocol { connector, .. } => connector,
        }
    }

    /// Advises whether repeating the failed call could succeed.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transient { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Unavailable { .. }
            | Self::Rejected { .. }
            | Self::Failed { .. }
            | Self::Protocol { .. } => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Reader errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::Reader::load_data`] and reader constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReaderError {
    /// The reader configuration is missing or invalid.
    ///
    /// Produced at construction time; no connector call is attempted.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The external connector failed; the error is passed through as raised.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

impl ReaderError {
    /// Shorthand for a [`ReaderError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_are_retryable() {
        let err = ConnectorError::Transient {
            connector: "source-zendesk-support".into(),
            message: "429 Too Many Requests".into(),
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(
            err.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn test_rejected_errors_are_not_retryable() {
        let err = ConnectorError::Rejected {
            connector: "source-zendesk-support".into(),
            message: "401 Unauthorized".into(),
        };
        assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(err.connector(), "source-zendesk-support");
    }

    #[test]
    fn test_connector_error_passes_through_reader_error_unchanged() {
        let inner = ConnectorError::Failed {
            connector: "fake".into(),
            message: "exit status 1".into(),
        };
        let err = ReaderError::from(inner.clone());

        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err, ReaderError::Connector(inner));
    }
}
