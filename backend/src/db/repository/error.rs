//! Error types for repository operations.

use crate::models::RuleError;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error type for repository operations.
///
/// Rule violations keep their structured form so callers can render a
/// precise message naming the entities involved; everything else is a
/// storage-layer concern.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An enrollment or catalog rule rejected the mutation. Never a system
    /// fault; the mutation was discarded in full.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Malformed request data that is not covered by a named rule, e.g. an
    /// offering submitted against the wrong period.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration or initialization error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal/unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True when the failure is a named enrollment rule rather than a
    /// storage fault.
    pub fn is_rule(&self) -> bool {
        matches!(self, Self::Rule(_))
    }

    /// The underlying rule violation, if any.
    pub fn rule(&self) -> Option<&RuleError> {
        match self {
            Self::Rule(rule) => Some(rule),
            _ => None,
        }
    }
}
