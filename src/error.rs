//! Error types for coverage-node

use thiserror::Error;

/// Failures of the catalog collaborators (SQLite or in-memory).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Caller-supplied input that violates a precondition.
///
/// Always detected before any catalog access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Valid 5-digit ZIP code required")]
    InvalidZip,

    #[error("Unsupported technology: {0}")]
    UnsupportedTechnology(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Catalog lookup failed: {0}")]
    Dependency(#[from] StoreError),
}

impl ResolveError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ResolveError::Validation(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
