//! PostgreSQL diagram store implementation.
//!
//! Uses sqlx for database operations and implements the DiagramStore trait.

use super::{StorageError, traits::*};
use crate::models::history::normalize_tag;
use crate::models::{Analysis, DiagramRecord, NewDiagram};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL diagram store.
pub struct PostgresDiagramStore {
    pool: PgPool,
}

impl PostgresDiagramStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; `diagram_type` stays a string so legacy tags written by
/// older releases still load, normalized on the way out.
#[derive(sqlx::FromRow)]
struct DiagramRow {
    id: Uuid,
    user_id: String,
    title: String,
    description: String,
    diagram_type: String,
    diagram_code: String,
    analysis: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl DiagramRow {
    fn into_record(self) -> DiagramRecord {
        DiagramRecord {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            diagram_type: normalize_tag(&self.diagram_type),
            diagram_code: self.diagram_code,
            analysis: serde_json::from_value::<Analysis>(self.analysis).unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

fn map_sqlx_error(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        Some(db_err) => StorageError::Query {
            message: db_err.message().to_string(),
            detail: db_err.constraint().map(|c| c.to_string()),
        },
        None => StorageError::ConnectionError(e.to_string()),
    }
}

#[async_trait]
impl DiagramStore for PostgresDiagramStore {
    async fn insert_diagram(
        &self,
        diagram: NewDiagram,
        user_context: &UserContext,
    ) -> Result<DiagramRecord, StorageError> {
        let analysis = serde_json::to_value(&diagram.analysis)
            .map_err(|e| StorageError::Other(e.to_string()))?;

        let row = sqlx::query_as::<_, DiagramRow>(
            r#"
            INSERT INTO diagrams (user_id, title, description, diagram_type, diagram_code, analysis)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, description, diagram_type, diagram_code, analysis, created_at
            "#,
        )
        .bind(&user_context.user_id)
        .bind(&diagram.title)
        .bind(&diagram.description)
        .bind(diagram.diagram_type.as_str())
        .bind(&diagram.diagram_code)
        .bind(analysis)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into_record())
    }

    async fn list_diagrams(
        &self,
        user_context: &UserContext,
    ) -> Result<Vec<DiagramRecord>, StorageError> {
        let rows = sqlx::query_as::<_, DiagramRow>(
            r#"
            SELECT id, user_id, title, description, diagram_type, diagram_code, analysis, created_at
            FROM diagrams
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(&user_context.user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DiagramRow::into_record).collect())
    }

    async fn get_diagram(
        &self,
        id: Uuid,
        user_context: &UserContext,
    ) -> Result<Option<DiagramRecord>, StorageError> {
        let row = sqlx::query_as::<_, DiagramRow>(
            r#"
            SELECT id, user_id, title, description, diagram_type, diagram_code, analysis, created_at
            FROM diagrams
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(&user_context.user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(DiagramRow::into_record))
    }
}
