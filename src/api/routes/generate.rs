//! Diagram generation route.
//!
//! One request/response round trip: validate, prompt the model once, parse
//! and normalize its answer, persist exactly one record, return it. Nothing
//! here retries; every failure is terminal for its request.

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{Analysis, DiagramType, HistoryItem, NewDiagram, MAX_INPUT_TEXT_LENGTH};
use crate::services::llm_client::LlmError;
use crate::services::parser::{self, ParsedOutput};
use crate::services::prompt::build_generation_prompt;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    text: Option<String>,
    /// Diagram type id, e.g. "er_diagram"
    diagram_type: Option<String>,
    /// Display name used in the prompt, e.g. "ER Diagram"
    diagram_type_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    message: String,
    diagram_id: Uuid,
    diagram_code: String,
    analysis: Analysis,
}

/// Create the diagram generation router
pub fn generate_router() -> Router<AppState> {
    Router::new().route("/generate", post(generate_diagram))
}

/// POST /generate - Generate a Mermaid diagram plus analysis from text
async fn generate_diagram(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    // Validation happens before any external call.
    let text = request.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Missing or invalid \"text\" field."));
    }
    if text.chars().count() > MAX_INPUT_TEXT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Input text exceeds maximum length of {} characters.",
            MAX_INPUT_TEXT_LENGTH
        )));
    }

    let raw_type = request.diagram_type.unwrap_or_default();
    if raw_type.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Missing or invalid \"diagramType\" (ID) field.",
        ));
    }
    let diagram_type_name = request.diagram_type_name.unwrap_or_default();
    if diagram_type_name.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Missing or invalid \"diagramTypeName\" (Display Name) field.",
        ));
    }
    let diagram_type = DiagramType::parse(&raw_type).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Invalid \"diagramType\" ID. Supported types are: {}.",
            DiagramType::supported_list()
        ))
        .with_details(json!({ "receivedType": raw_type }))
    })?;

    // One attempt, no retry, no timeout override.
    let prompt = build_generation_prompt(&diagram_type_name, &text);
    let content = state
        .generation_llm
        .complete(&prompt)
        .await
        .map_err(map_generation_error)?;
    if content.trim().is_empty() {
        return Err(ApiError::internal("No content in LLM response."));
    }

    let (diagram_code, analysis) = match parser::parse_llm_output(&content) {
        ParsedOutput::Declined { reason } => {
            return Err(ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("AI could not process the request: {}", reason),
            ));
        }
        ParsedOutput::Failed {
            message,
            snippet,
            detail,
        } => {
            return Err(ApiError::internal(message).with_details(json!({
                "responseContent": snippet,
                "error": detail,
            })));
        }
        ParsedOutput::Structured {
            diagram_code,
            analysis,
        }
        | ParsedOutput::Recovered {
            diagram_code,
            analysis,
        } => (diagram_code, analysis),
    };

    let analysis = parser::normalize_analysis(analysis, &text);
    let title = parser::derive_title(&analysis.summary, &text);

    let record = state
        .store
        .insert_diagram(
            NewDiagram {
                user_id: auth.user_context.user_id.clone(),
                title,
                description: text,
                diagram_type,
                diagram_code,
                analysis,
            },
            &auth.user_context,
        )
        .await?;

    state
        .push_recent(
            &auth.user_context.user_id,
            HistoryItem {
                title: record.title.clone(),
                diagram_type_tag: record.diagram_type.as_str().to_string(),
                diagram_code: record.diagram_code.clone(),
                analysis: record.analysis.clone(),
                created_at: record.created_at,
            },
        )
        .await;

    Ok(Json(GenerateResponse {
        message: "Diagram generated successfully.".to_string(),
        diagram_id: record.id,
        diagram_code: record.diagram_code,
        analysis: record.analysis,
    }))
}

/// Generation treats any upstream failure as unavailability; the enhancement
/// flow is the one that relays upstream statuses.
fn map_generation_error(e: LlmError) -> ApiError {
    match e {
        LlmError::Upstream { status, message } => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Failed to communicate with LLM service.",
        )
        .with_details(json!({ "status": status, "error": message })),
        LlmError::Network(message) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Failed to communicate with LLM service.",
        )
        .with_details(json!({ "error": message })),
        LlmError::NotConfigured => {
            ApiError::internal("Server configuration error: Missing LLM API key.")
        }
        LlmError::EmptyCompletion => ApiError::internal("No content in LLM response."),
    }
}
