//! Storage trait definitions for the diagram store backends.

use crate::models::{DiagramRecord, NewDiagram};
use serde::{Deserialize, Serialize};

/// User context for storage operations. The id is the opaque identifier the
/// identity provider assigns; the store never interprets it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
}

/// Storage backend trait for diagram persistence.
///
/// One insert per successful generation; records are never updated. History
/// reads are scoped to the owner and ordered newest first.
#[async_trait::async_trait]
pub trait DiagramStore: Send + Sync {
    /// Insert a diagram and return the stored record with its assigned id.
    async fn insert_diagram(
        &self,
        diagram: NewDiagram,
        user_context: &UserContext,
    ) -> Result<DiagramRecord, super::StorageError>;

    /// List the owner's diagrams, created_at descending.
    async fn list_diagrams(
        &self,
        user_context: &UserContext,
    ) -> Result<Vec<DiagramRecord>, super::StorageError>;

    /// Fetch one diagram by id, scoped to the owner.
    async fn get_diagram(
        &self,
        id: uuid::Uuid,
        user_context: &UserContext,
    ) -> Result<Option<DiagramRecord>, super::StorageError>;
}
