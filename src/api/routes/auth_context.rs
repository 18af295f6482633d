//! Authentication context utilities.
//!
//! Extracts the identity-provider session token from the request and resolves
//! it to an opaque user id. Rejection happens before any handler code runs,
//! so an unauthenticated request never reaches an external collaborator.

use super::app_state::AppState;
use super::error::ApiError;
use crate::services::session_verifier::SessionVerifier;
use crate::storage::traits::UserContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_context: UserContext,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(SessionVerifier::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                ApiError::unauthorized()
            })?;

        let claims = state.verifier.verify(token).map_err(|e| {
            tracing::warn!("Session token validation failed: {}", e);
            ApiError::unauthorized()
        })?;

        if claims.sub.is_empty() {
            tracing::warn!("Session token has empty subject claim");
            return Err(ApiError::unauthorized());
        }

        Ok(AuthContext {
            user_context: UserContext { user_id: claims.sub },
        })
    }
}
