//! Error types for the ContextLoom rendering core.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure surfaces
//! to the caller: nothing is converted to empty text.

use thiserror::Error;

/// Boxed error raised by a caller-supplied callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The top-level error type for all rendering operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Log stream errors ---
    #[error("invalid log entry: unrecognized kind `{kind}`")]
    InvalidLogKind { kind: String },

    // --- Schema errors ---
    #[error("Schema conversion failed: {0}")]
    Schema(#[from] SchemaError),

    // --- Callback errors ---
    #[error("Callback failed: {0}")]
    Callback(#[source] BoxError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an arbitrary error raised inside a description, instructions,
    /// render, or working-memory callback.
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }

    /// Build an [`Error::InvalidLogKind`] for the given discriminant.
    pub fn invalid_log_kind(kind: impl Into<String>) -> Self {
        Self::InvalidLogKind { kind: kind.into() }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures converting a raw data shape into its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("root name must not be empty")]
    EmptyRootName,

    #[error("enum field `{field}` declares no values")]
    EmptyEnum { field: String },

    #[error("{0}")]
    Conversion(String),
}
