//! Diagram export route.

use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;

use super::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::services::export_service::{ExportError, ExportOutcome, ExportService};

const DEFAULT_SCALE: f32 = 2.0;

// Client-supplied scale is clamped; an arbitrary factor would size the pixel
// buffer allocation.
const MIN_SCALE: f32 = 0.5;
const MAX_SCALE: f32 = 8.0;

#[derive(Deserialize)]
struct ExportRequest {
    svg: Option<String>,
    scale: Option<f32>,
}

/// Create the export router
pub fn export_router() -> Router<AppState> {
    Router::new().route("/png", post(export_png))
}

/// POST /export/png - Rasterize rendered SVG markup for download.
///
/// Best effort: when rasterization fails the response degrades to the
/// sanitized SVG, marked with an `x-export-fallback` header so the client can
/// warn the user.
async fn export_png(
    State(_state): State<AppState>,
    _auth: AuthContext,
    axum::Json(request): axum::Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let svg = request.svg.unwrap_or_default();
    if svg.trim().is_empty() {
        return Err(ApiError::bad_request("Missing or invalid \"svg\" field."));
    }
    let scale = request
        .scale
        .unwrap_or(DEFAULT_SCALE)
        .clamp(MIN_SCALE, MAX_SCALE);

    match ExportService::export(&svg, scale) {
        Ok(ExportOutcome::Png(png)) => Ok(([
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"diagram.png\"".to_string(),
            ),
        ], png)
            .into_response()),
        Ok(ExportOutcome::SvgFallback { svg, reason }) => {
            tracing::warn!("Export degraded to SVG: {}", reason);
            Ok(([
                (header::CONTENT_TYPE, "image/svg+xml".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"diagram.svg\"".to_string(),
                ),
                (
                    header::HeaderName::from_static("x-export-fallback"),
                    "svg".to_string(),
                ),
            ], svg)
                .into_response())
        }
        Err(ExportError::EmptySvg) => {
            Err(ApiError::bad_request("Missing or invalid \"svg\" field."))
        }
        Err(e) => Err(ApiError::bad_request(format!("Invalid SVG markup: {}", e))),
    }
}
