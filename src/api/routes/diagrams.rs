//! Diagram history routes.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{Analysis, DiagramRecord, DiagramType};

/// A recent in-memory result with its stored tag normalized to a current
/// diagram type.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentItem {
    title: String,
    diagram_type: DiagramType,
    diagram_code: String,
    analysis: Analysis,
    created_at: DateTime<Utc>,
}

/// Create the diagram history router
pub fn diagrams_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_diagrams))
        .route("/recent", get(recent_diagrams))
        .route("/{id}", get(get_diagram))
}

/// GET /diagrams - The caller's persisted diagrams, newest first
async fn list_diagrams(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<DiagramRecord>>, ApiError> {
    let diagrams = state.store.list_diagrams(&auth.user_context).await?;
    Ok(Json(diagrams))
}

/// GET /diagrams/recent - This session's recent results, types normalized
async fn recent_diagrams(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<RecentItem>>, ApiError> {
    let items = state
        .recent_for(&auth.user_context.user_id)
        .await
        .into_iter()
        .map(|item| RecentItem {
            diagram_type: item.normalized_type(),
            title: item.title,
            diagram_code: item.diagram_code,
            analysis: item.analysis,
            created_at: item.created_at,
        })
        .collect();
    Ok(Json(items))
}

/// GET /diagrams/{id} - One persisted diagram, owner-scoped
async fn get_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagramRecord>, ApiError> {
    let diagram = state
        .store
        .get_diagram(id, &auth.user_context)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Diagram {} not found", id)))?;
    Ok(Json(diagram))
}
