use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AbandonResponse, StartQuizResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// Message suitable for showing to the learner.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Server { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Remote quiz API as seen by the session machine.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn start(&self, level_id: &str) -> Result<StartQuizResponse, BackendError>;

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, BackendError>;

    async fn abandon(&self, level_id: &str) -> Result<AbandonResponse, BackendError>;
}
