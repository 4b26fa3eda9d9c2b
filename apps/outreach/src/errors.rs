use thiserror::Error;

use crate::cache::CacheError;
use crate::chunker::ChunkError;
use crate::conversation::ConversationError;
use crate::fetcher::FetchError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Every failure that can end a lead's run funnels into this enum; `main`
/// prints its message and exits non-zero.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Chunking error: {0}")]
    Chunk(#[from] ChunkError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable code, used as a structured field in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Usage(_) => "USAGE_ERROR",
            AppError::Fetch(_) => "FETCH_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Cache(_) => "CACHE_ERROR",
            AppError::Chunk(_) => "CHUNK_ERROR",
            AppError::Conversation(_) => "CONVERSATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
