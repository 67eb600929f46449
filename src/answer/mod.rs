// src/answer/mod.rs
pub mod http_client;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use std::sync::Arc;

pub use http_client::HttpAnswerClient;

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("request to answer service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("answer service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("answer service body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("answer service response has no `answer` field")]
    MissingAnswer,
    #[error("answer task ended without a result")]
    Interrupted,
}

/// Something that can answer a single, context-free question.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, AnswerError>;
}

#[async_trait]
impl<T: AnswerService + ?Sized> AnswerService for Arc<T> {
    async fn ask(&self, question: &str) -> Result<String, AnswerError> {
        (**self).ask(question).await
    }
}
