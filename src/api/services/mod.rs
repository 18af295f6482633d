// Services module - LLM backends, response parsing, auth, export

pub mod export_service;
pub mod llm_client;
pub mod parser;
pub mod prompt;
pub mod session_verifier;

pub use export_service::ExportService;
pub use llm_client::{ChatCompletionClient, LlmBackend, LlmError};
pub use parser::ParsedOutput;
pub use session_verifier::SessionVerifier;
