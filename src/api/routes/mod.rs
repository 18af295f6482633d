//! API routes module - organizes all route handlers.

pub mod app_state;
pub mod auth_context;
pub mod diagrams;
pub mod enhance;
pub mod error;
pub mod export;
pub mod generate;

use axum::Router;
pub use app_state::AppState;

/// Create the main API router combining all route modules
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(generate::generate_router())
        .merge(enhance::enhance_router())
        .nest("/diagrams", diagrams::diagrams_router())
        .nest("/export", export::export_router())
}

/// Create application state from environment configuration
pub fn create_app_state() -> AppState {
    AppState::from_env()
}
