//! # API Error Types
//!
//! Error types for every request made to the backend.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        API Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ConfigError    │  │  Http           │  │  Remote {status, msg}   │ │
//! │  │  (file, url,    │  │  (connect,      │  │  Unauthorized           │ │
//! │  │   values)       │  │   timeout)      │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `Remote` carries a message meant for the user. Everything else is
//! logged and shown as a generic message by the dashboard.

use thiserror::Error;

/// Result type alias for collaborator calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the backend collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got an answer (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the human-readable text found in the error payload.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The backend rejected the credentials or the session token.
    #[error("Not authenticated")]
    Unauthorized,

    /// The backend answered with something we cannot use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A body could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Shorthand for a remote rejection.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        ApiError::Remote {
            status,
            message: message.into(),
        }
    }

    /// The backend's own message, when there is one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ApiError::Remote { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading, validating or saving [`crate::config::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoConfigPath,
}

impl From<url::ParseError> for ConfigError {
    fn from(err: url::ParseError) -> Self {
        ConfigError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_displays_server_message_verbatim() {
        let err = ApiError::remote(409, "warehouse has stock");
        assert_eq!(err.to_string(), "warehouse has stock");
        assert_eq!(err.remote_message(), Some("warehouse has stock"));
    }

    #[test]
    fn test_config_errors_convert() {
        let err: ConfigError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));

        let api: ApiError = err.into();
        assert!(api.to_string().starts_with("Invalid base URL"));
        assert!(api.remote_message().is_none());
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::remote(500, "boom").is_unauthorized());
    }
}
