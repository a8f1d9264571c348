use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic classification of a failed catalog request. Never shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Status,
    Payload,
    Cancelled,
    Config,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind:?}: {message}")]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl FailureReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
