//! In-memory diagram store.
//!
//! Used when no DATABASE_URL is configured and by the endpoint tests. Same
//! contract as the PostgreSQL backend; nothing survives a restart.

use super::{StorageError, traits::*};
use crate::models::{DiagramRecord, NewDiagram};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDiagramStore {
    records: Mutex<Vec<DiagramRecord>>,
}

impl MemoryDiagramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records. Test hook for no-write assertions.
    pub async fn count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl DiagramStore for MemoryDiagramStore {
    async fn insert_diagram(
        &self,
        diagram: NewDiagram,
        user_context: &UserContext,
    ) -> Result<DiagramRecord, StorageError> {
        let record = DiagramRecord {
            id: Uuid::new_v4(),
            user_id: user_context.user_id.clone(),
            title: diagram.title,
            description: diagram.description,
            diagram_type: diagram.diagram_type,
            diagram_code: diagram.diagram_code,
            analysis: diagram.analysis,
            created_at: Utc::now(),
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list_diagrams(
        &self,
        user_context: &UserContext,
    ) -> Result<Vec<DiagramRecord>, StorageError> {
        let records = self.records.lock().await;
        let mut owned: Vec<DiagramRecord> = records
            .iter()
            .filter(|r| r.user_id == user_context.user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get_diagram(
        &self,
        id: Uuid,
        user_context: &UserContext,
    ) -> Result<Option<DiagramRecord>, StorageError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .find(|r| r.id == id && r.user_id == user_context.user_id)
            .cloned())
    }
}
