//! Error types for the MutualRisk terminal.

use thiserror::Error;

/// The main error type for MutualRisk.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never produced a response (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not match the endpoint's schema.
    #[error("Failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a new decode error for an endpoint.
    pub fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this error is recoverable (user can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Channel(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("request timeout: {}", e))
        } else if e.is_connect() {
            Self::Transport(format!("connection failed: {}", e))
        } else {
            Self::Transport(format!("request failed: {}", e))
        }
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
