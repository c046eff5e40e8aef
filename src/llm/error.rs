//! LLM error types

use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Timeout, message)
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Status, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Malformed, message)
    }
}

/// Error classification. Every kind degrades the turn to pattern-only NLU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection failures
    Network,
    /// No answer within the NLU budget
    Timeout,
    /// Non-2xx response
    Status,
    /// Response body or completion text did not parse
    Malformed,
}
