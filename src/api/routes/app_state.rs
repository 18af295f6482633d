//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state:
//! the diagram store, the two LLM backends, the session verifier, and the
//! per-user recent-history buffers.

use crate::models::{HistoryBuffer, HistoryItem};
use crate::services::llm_client::{ChatCompletionClient, LlmBackend};
use crate::services::session_verifier::SessionVerifier;
use crate::storage::{DiagramStore, MemoryDiagramStore, PostgresDiagramStore, StorageError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// How many users can have a live recent-history buffer at once. When a new
/// user arrives at the limit, the user whose newest entry is stalest loses
/// their buffer. Persisted history is unaffected.
pub const MAX_TRACKED_USERS: usize = 1000;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Diagram persistence backend
    pub store: Arc<dyn DiagramStore>,
    /// LLM backend for diagram generation
    pub generation_llm: Arc<dyn LlmBackend>,
    /// LLM backend for prompt enhancement
    pub enhancement_llm: Arc<dyn LlmBackend>,
    /// Session token verifier
    pub verifier: Arc<SessionVerifier>,
    /// Recent generation results per user (ephemeral, capped)
    pub recent: Arc<Mutex<HashMap<String, HistoryBuffer>>>,
}

impl AppState {
    /// Build state from environment configuration. Starts on the in-memory
    /// store; call `init_storage` to switch to PostgreSQL when DATABASE_URL
    /// is set.
    pub fn from_env() -> Self {
        Self::with_collaborators(
            Arc::new(MemoryDiagramStore::new()),
            Arc::new(ChatCompletionClient::generation_from_env()),
            Arc::new(ChatCompletionClient::enhancement_from_env()),
            Arc::new(SessionVerifier::from_env()),
        )
    }

    /// Build state with explicit collaborators. Tests use this to substitute
    /// mock backends.
    pub fn with_collaborators(
        store: Arc<dyn DiagramStore>,
        generation_llm: Arc<dyn LlmBackend>,
        enhancement_llm: Arc<dyn LlmBackend>,
        verifier: Arc<SessionVerifier>,
    ) -> Self {
        Self {
            store,
            generation_llm,
            enhancement_llm,
            verifier,
            recent: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Initialize storage backend from environment configuration.
    ///
    /// Connects to PostgreSQL and runs migrations if DATABASE_URL is set,
    /// otherwise keeps the in-memory store.
    pub async fn init_storage(&mut self) -> Result<(), StorageError> {
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            match sqlx::PgPool::connect(&database_url).await {
                Ok(pool) => {
                    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                        return Err(StorageError::ConnectionError(format!(
                            "Migration failed: {}",
                            e
                        )));
                    }
                    self.store = Arc::new(PostgresDiagramStore::new(pool));
                    Ok(())
                }
                Err(e) => Err(StorageError::ConnectionError(format!(
                    "Failed to connect to database: {}",
                    e
                ))),
            }
        } else {
            // In-memory storage (no database)
            Ok(())
        }
    }

    /// Record a generation result in the user's recent buffer, evicting the
    /// stalest user's buffer when the tracked-user limit is reached.
    pub async fn push_recent(&self, user_id: &str, item: HistoryItem) {
        let mut recent = self.recent.lock().await;
        if !recent.contains_key(user_id) && recent.len() >= MAX_TRACKED_USERS {
            let stalest = recent
                .iter()
                .min_by_key(|(_, buf)| buf.get(0).map(|i| i.created_at))
                .map(|(key, _)| key.clone());
            if let Some(key) = stalest {
                recent.remove(&key);
            }
        }
        recent.entry(user_id.to_string()).or_default().push(item);
    }

    /// Snapshot of the user's recent buffer, newest first.
    pub async fn recent_for(&self, user_id: &str) -> Vec<HistoryItem> {
        let recent = self.recent.lock().await;
        recent
            .get(user_id)
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }
}
