//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Non-success HTTP response, normalized to the body's `message` plus the
    /// numeric status so callers can branch on codes (409 = duplicate
    /// registration) without touching transport details.
    #[error("{message} (HTTP {status})")]
    Api { message: String, status: u16 },

    /// Locally detected, field-scoped input problem. Never reaches the network.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The refresh-token exchange failed. Local tokens have already been
    /// cleared; the only way forward is a fresh login.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// All three evaluation survey writes failed.
    #[error("{0}")]
    Submission(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an API error
    pub fn api(message: impl Into<String>, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a 409 conflict (duplicate registration)
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
