//! Zendesk Support connector configuration.
//!
//! Mirrors the configuration object accepted by the Airbyte Zendesk Support
//! source. Validation covers only what the connector's own schema requires;
//! whether the credentials actually work is for the connector to find out.
//!
//! # Example
//!
//! ```json
//! {
//!   "subdomain": "acme",
//!   "start_date": "2024-01-01T00:00:00Z",
//!   "credentials": {
//!     "credentials": "api_token",
//!     "email": "agent@acme.com",
//!     "api_token": "xxxx"
//!   }
//! }
//! ```

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use reader::ReaderError;

/// Streams exposed by the Zendesk Support source.
///
/// Informational only: readers pass any stream name through and let the
/// connector decide.
pub const ZENDESK_SUPPORT_STREAMS: &[&str] = &[
    "account_attributes",
    "articles",
    "attribute_definitions",
    "audit_logs",
    "brands",
    "custom_roles",
    "group_memberships",
    "groups",
    "macros",
    "organization_fields",
    "organization_memberships",
    "organizations",
    "posts",
    "satisfaction_ratings",
    "schedules",
    "sla_policies",
    "tags",
    "ticket_activities",
    "ticket_audits",
    "ticket_comments",
    "ticket_fields",
    "ticket_forms",
    "ticket_metric_events",
    "ticket_metrics",
    "ticket_skips",
    "tickets",
    "topics",
    "user_fields",
    "users",
];

/// Authentication method for the Zendesk API.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "credentials")]
pub enum ZendeskCredentials {
    /// Agent email plus API token.
    #[serde(rename = "api_token")]
    ApiToken {
        /// Agent email address.
        email: String,
        /// API token generated in the Zendesk admin center.
        api_token: String,
    },
    /// OAuth access token.
    #[serde(rename = "oauth2.0")]
    OAuth2 {
        /// Bearer access token.
        access_token: String,
    },
}

impl std::fmt::Debug for ZendeskCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiToken { email, .. } => f
                .debug_struct("ApiToken")
                .field("email", email)
                .field("api_token", &"<redacted>")
                .finish(),
            Self::OAuth2 { .. } => f
                .debug_struct("OAuth2")
                .field("access_token", &"<redacted>")
                .finish(),
        }
    }
}

/// Configuration for the Zendesk Support source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ZendeskSupportConfig {
    /// Account subdomain: `acme` for `https://acme.zendesk.com`.
    pub subdomain: String,

    /// Earliest record to replicate (RFC 3339, e.g. `2024-01-01T00:00:00Z`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// How to authenticate. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<ZendeskCredentials>,

    /// Fetch only the first page of each stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_pagination: Option<bool>,

    /// Any other connector options, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ZendeskSupportConfig {
    /// Parses and validates a raw configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if the object does not match the
    /// connector schema or fails [`ZendeskSupportConfig::validate`].
    pub fn from_value(value: Value) -> Result<Self, ReaderError> {
        let mut config: ZendeskSupportConfig = serde_json::from_value(value).map_err(|e| {
            ReaderError::configuration(format!("Invalid Zendesk Support config: {e}"))
        })?;
        // The connector builds `https://{subdomain}.zendesk.com` verbatim.
        config.subdomain = config.subdomain.trim().to_string();
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields the connector requires before it will start.
    pub fn validate(&self) -> Result<(), ReaderError> {
        let subdomain = self.subdomain.trim();
        if subdomain.is_empty() {
            return Err(ReaderError::configuration(
                "Zendesk subdomain is required",
            ));
        }
        if !subdomain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ReaderError::configuration(format!(
                "Zendesk subdomain '{subdomain}' must be the bare subdomain (e.g. 'acme' for acme.zendesk.com)"
            )));
        }

        if let Some(start_date) = &self.start_date {
            DateTime::parse_from_rfc3339(start_date).map_err(|e| {
                ReaderError::configuration(format!(
                    "start_date '{start_date}' is not an RFC 3339 timestamp: {e}"
                ))
            })?;
        }

        match &self.credentials {
            None => Err(ReaderError::configuration(
                "Zendesk credentials are required",
            )),
            Some(ZendeskCredentials::ApiToken { email, api_token }) => {
                if !email.contains('@') {
                    return Err(ReaderError::configuration(
                        "Zendesk api_token credentials need an agent email address",
                    ));
                }
                if api_token.trim().is_empty() {
                    return Err(ReaderError::configuration(
                        "Zendesk api_token must not be empty",
                    ));
                }
                Ok(())
            }
            Some(ZendeskCredentials::OAuth2 { access_token }) => {
                if access_token.trim().is_empty() {
                    return Err(ReaderError::configuration(
                        "Zendesk access_token must not be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Serialises the configuration into the object handed to the connector.
    pub fn to_value(&self) -> Result<Value, ReaderError> {
        serde_json::to_value(self).map_err(|e| {
            ReaderError::configuration(format!("Failed to encode Zendesk Support config: {e}"))
        })
    }
}

/// Returns `true` if `stream` is a stream the Zendesk Support source is known
/// to expose.
pub fn is_known_stream(stream: &str) -> bool {
    ZENDESK_SUPPORT_STREAMS.contains(&stream)
}
