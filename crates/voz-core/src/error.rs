//! Error types for voz

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("{kind} already exists: {key}")]
    AlreadyExists { kind: &'static str, key: String },

    #[error("Sheet '{0}' changed while it was being updated")]
    Conflict(String),

    #[error("Administrative access denied")]
    Unauthorized,

    #[error("Store not initialized. Run 'voz init' first.")]
    NotInitialized,

    #[error("Store already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("Sheet store error: {0}")]
    Store(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn ticket_not_found(id: &str) -> Self {
        Error::NotFound {
            kind: "Ticket",
            key: id.to_string(),
        }
    }

    pub(crate) fn project_not_found(name: &str) -> Self {
        Error::NotFound {
            kind: "Project",
            key: name.to_string(),
        }
    }
}

/// Failure reported by a notification sink.
///
/// Never aborts the data operation that triggered it; see [`crate::Notice`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Invalid email address: {0}")]
    Address(String),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}
