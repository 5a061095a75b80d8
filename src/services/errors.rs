use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input failed its capability schema
    Validation,
    /// Provider returned no usable payload
    EmptyOutput,
    /// Empty payload attributed to a content-safety finish reason
    SafetyRefusal,
    /// Transport, credential or provider-level failure
    Provider,
    /// Non-error value (a panic payload) caught at the provider boundary
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::EmptyOutput => "EmptyOutputError",
            ErrorKind::SafetyRefusal => "SafetyRefusalError",
            ErrorKind::Provider => "ProviderError",
            ErrorKind::Unknown => "UnknownError",
        };
        write!(f, "{}", s)
    }
}

/// Classified failure of a generation call. `Display` is the user-facing
/// message and nothing else, so the orchestrator can surface it verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn empty_output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyOutput, message)
    }

    pub fn safety_refusal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SafetyRefusal, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Provider, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}
