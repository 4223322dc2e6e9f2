//! Domain error types.

use thiserror::Error;

/// Errors raised by domain rules.
///
/// Every authorization or state-machine violation is a `PermissionDenied`
/// carrying a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        DomainError::PermissionDenied(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        DomainError::Validation(reason.into())
    }
}
