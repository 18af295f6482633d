//! Storage error types for the diagram store backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// Database connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// Insert or query failure with backend detail
    #[error("Storage error: {message}")]
    Query {
        message: String,
        detail: Option<String>,
    },
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}
