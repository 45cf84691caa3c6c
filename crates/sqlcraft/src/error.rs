//! Error types for sqlcraft

use thiserror::Error;

/// Result type alias for sqlcraft operations
pub type CraftResult<T> = Result<T, CraftError>;

/// Error types for building, rendering and executing statements
#[derive(Debug, Error)]
pub enum CraftError {
    /// A membership list was built from more literal values than allowed
    #[error("Too many values for IN list: {count} (max {max})")]
    TooManyValues { count: usize, max: usize },

    /// A SELECT was rendered without a FROM target
    #[error("MissingFromClause")]
    MissingFromClause,

    /// INSERT/UPDATE rendered without any column assignment
    #[error("{0} has no column assignments")]
    EmptyAssignments(&'static str),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row field decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error raised by the execution backend or cache
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CraftError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap a collaborator error so it can travel through the core unchanged
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    /// Check if this is a missing FROM clause error
    pub fn is_missing_from(&self) -> bool {
        matches!(self, Self::MissingFromClause)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
