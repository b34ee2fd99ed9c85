use thiserror::Error;

use nimbus_dryrun::TransportError;

/// Failure of one upstream call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Free-form upstream failure (e.g. "service unavailable").
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("object not found: {name}")]
    ObjectNotFound { name: String },

    #[error("invalid object name: {0}")]
    InvalidName(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("upstream error: {0}")]
    Api(#[from] ApiError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconcilerError {
    /// Prepend object identity to the error message.
    pub fn with_object(self, name: &str) -> Self {
        match self {
            Self::Config(msg) => Self::Config(format!("{name}: {msg}")),
            other => other,
        }
    }
}

pub use nimbus_dryrun::error::format_err_chain;
