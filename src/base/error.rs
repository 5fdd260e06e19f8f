//! Error taxonomy for tool invocations.
//!
//! Tools never propagate a fault to the agent; every variant here is rendered
//! as a structured `{"error": ...}` result by the registry.

use thiserror::Error;

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A ticket, file, or directory does not exist.
    #[error("{0}")]
    NotFound(String),
    /// A path resolved outside the sandboxed code root.
    #[error("Access denied: {0}")]
    AccessDenied(String),
    /// The caller supplied arguments that cannot be acted on.
    #[error("{0}")]
    InvalidArguments(String),
    /// Anything unexpected (I/O, parsing, storage), carrying the underlying message.
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(format!("{err:#}"))
    }
}

pub type ToolRes<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_message_is_prefixed() {
        let err = ToolError::access_denied("File path is outside the allowed CodeBase directory.");

        assert_eq!(err.to_string(), "Access denied: File path is outside the allowed CodeBase directory.");
    }

    #[test]
    fn test_anyhow_errors_keep_their_context() {
        let err: ToolError = anyhow::anyhow!("disk on fire").context("Failed to read code file").into();

        assert!(matches!(err, ToolError::Failed(_)));
        assert_eq!(err.to_string(), "Failed to read code file: disk on fire");
    }
}
