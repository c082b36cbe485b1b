use serde::{Deserialize, Serialize};

use super::question::{Question, RawQuestion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizResponse {
    pub attempt_id: String,
    pub session: SessionState,
    pub first_question: QuestionEnvelope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub total_questions: u32,
    pub hearts_remaining: u32,
    pub current_question_number: u32,
}

/// Partial session data attached to a next question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearts_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEnvelope {
    pub question: RawQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestion {
    pub question: RawQuestion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub level_id: String,
    pub question_id: String,
    pub user_answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizComplete {
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub hearts_remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question: Option<NextQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_complete: Option<QuizComplete>,
    #[serde(default)]
    pub level_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbandonResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Verdict on the most recent answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub is_correct: bool,
    pub message: String,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
}

impl From<&SubmitAnswerResponse> for AnswerResult {
    fn from(response: &SubmitAnswerResponse) -> Self {
        Self {
            is_correct: response.is_correct,
            message: response.message.clone(),
            correct_answer: response.correct_answer.clone(),
            explanation: response.explanation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub user_answer: String,
}

/// One answered question kept for review once the attempt is over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub question: Option<Question>,
    pub user_answer: String,
    pub result: AnswerResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalOutcome {
    #[default]
    None,
    Completed {
        score: u32,
    },
    Failed,
}

impl TerminalOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminalOutcome::None)
    }
}
