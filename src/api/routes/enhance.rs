//! Prompt enhancement route.

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::{Deserialize, Serialize};

use super::auth_context::AuthContext;
use super::error::ApiError;
use super::AppState;
use crate::services::llm_client::LlmError;
use crate::services::prompt::build_enhancement_prompt;

#[derive(Deserialize)]
struct EnhancePromptRequest {
    idea: Option<String>,
    context: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnhancePromptResponse {
    suggested_prompt: String,
}

/// Create the prompt enhancement router
pub fn enhance_router() -> Router<AppState> {
    Router::new().route("/enhance-prompt", post(enhance_prompt))
}

/// POST /enhance-prompt - Refine a rough idea into a usable generation prompt
async fn enhance_prompt(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<EnhancePromptRequest>,
) -> Result<Json<EnhancePromptResponse>, ApiError> {
    let idea = request.idea.unwrap_or_default();
    let context = request.context.unwrap_or_default();
    if idea.trim().is_empty() || context.trim().is_empty() {
        return Err(ApiError::bad_request("Missing idea or context"));
    }

    let prompt = build_enhancement_prompt(&idea, &context);
    let completion = state
        .enhancement_llm
        .complete(&prompt)
        .await
        .map_err(map_enhancement_error)?;

    let suggested_prompt = completion.trim().to_string();
    if suggested_prompt.is_empty() {
        return Err(ApiError::internal(
            "Failed to get suggestion from LLM service",
        ));
    }

    Ok(Json(EnhancePromptResponse { suggested_prompt }))
}

/// Upstream failures propagate the upstream's own status; everything else is
/// an internal error.
fn map_enhancement_error(e: LlmError) -> ApiError {
    match e {
        LlmError::Upstream { status, message } => ApiError::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Error from LLM service: {}", message),
        ),
        other => ApiError::internal(format!("Internal Server Error: {}", other)),
    }
}
