//! Application error types.
//!
//! Every variant is fatal for a reminder run: the binary logs the error
//! and exits with status 1.

use thiserror::Error;

/// Application-level errors raised while talking to Bitbucket or
/// interpreting its responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bitbucket answered with a non-success status.
    #[error("Bitbucket API error: {message} ({status_code} on {endpoint})")]
    ServerApi {
        message: String,
        status_code: u16,
        endpoint: String,
    },

    /// Network request failed before a response was received.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A pull request is missing a field the reminder checks rely on.
    #[error("Pull request {pr_id} is missing required field `{field}`")]
    MissingField { pr_id: u64, field: String },

    /// Invalid input provided (bad URL, bad token, bad threshold).
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a Bitbucket API error with status code and endpoint.
    pub fn server_api(
        message: impl Into<String>,
        status_code: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::ServerApi {
            message: message.into(),
            status_code,
            endpoint: endpoint.into(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a missing field error for a pull request.
    pub fn missing_field(pr_id: u64, field: impl Into<String>) -> Self {
        Self::MissingField {
            pr_id,
            field: field.into(),
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status reported by the server, if the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerApi { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else if err.is_decode() {
            Self::internal(format!("Failed to parse response: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}
