use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::metrics::{
    record_answer, record_attempt_event, record_stale_response, ABANDON_FAILURES_TOTAL,
};
use crate::models::{
    AnswerResult, DataContractError, Question, ReviewEntry, StartQuizResponse, SubmitAnswerRequest,
    SubmitAnswerResponse, SubmittedAnswer, TerminalOutcome,
};

use super::backend::{BackendError, QuizBackend};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("level id must not be empty")]
    InvalidInput,

    #[error("no quiz attempt is active")]
    NoActiveAttempt,

    #[error("another quiz request is still in flight")]
    Busy,

    #[error("response belongs to an attempt that is no longer current")]
    Superseded,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Contract(#[from] DataContractError),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Backend(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Start,
    Submit,
    Abandon,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Submit => "submit",
            Operation::Abandon => "abandon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Loading(Operation),
    Active,
    Completed,
    Failed,
    Error(String),
}

/// Local mirror of the attempt the learner is currently taking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub attempt_id: Option<String>,
    pub level_id: Option<String>,
    pub hearts_remaining: u32,
    pub total_questions: u32,
    pub current_question_number: u32,
    pub answers: Vec<SubmittedAnswer>,
    pub current_question: Option<Question>,
    pub terminal_outcome: TerminalOutcome,
    pub last_answer_result: Option<AnswerResult>,
    pub review: Vec<ReviewEntry>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub attempt: QuizAttempt,
}

impl SessionSnapshot {
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, SessionPhase::Loading(_))
    }
}

/// What a single submission did to the attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub result: AnswerResult,
    pub hearts_remaining: u32,
    pub outcome: TerminalOutcome,
    /// The backend failed the level with no hearts left and the attempt was
    /// torn down before returning.
    pub auto_abandoned: bool,
}

struct Inner {
    phase: SessionPhase,
    attempt: QuizAttempt,
    generation: u64,
}

impl Inner {
    fn fail(&mut self, operation: Operation, err: SessionError) -> SessionError {
        tracing::error!("Quiz {} failed: {}", operation.as_str(), err);
        self.phase = SessionPhase::Error(err.user_message());
        record_attempt_event("error");
        err
    }

    fn discard(&self, operation: Operation, issued_at: u64) -> SessionError {
        tracing::debug!(
            "Discarding stale {} response (issued at generation {}, current {})",
            operation.as_str(),
            issued_at,
            self.generation
        );
        record_stale_response(operation.as_str());
        SessionError::Superseded
    }

    /// Resets the attempt under a new generation. Returns the level to
    /// abandon on the server, if the server knows about one.
    fn begin_abandon(&mut self) -> Option<(u64, String)> {
        let server_side = self.attempt.attempt_id.is_some()
            || self.phase == SessionPhase::Loading(Operation::Start);

        self.generation += 1;
        let level_id = self.attempt.level_id.take().filter(|_| server_side);
        self.attempt = QuizAttempt::default();
        self.phase = match level_id {
            Some(_) => SessionPhase::Loading(Operation::Abandon),
            None => SessionPhase::Idle,
        };
        level_id.map(|level_id| (self.generation, level_id))
    }
}

/// Client-side state machine for one quiz attempt at a time.
///
/// Cloning yields another handle to the same machine. Backend calls are made
/// without holding the state lock, so `abandon` may be called while a submit
/// is in flight; responses issued under an older generation are dropped.
#[derive(Clone)]
pub struct QuizSessionMachine {
    backend: Arc<dyn QuizBackend>,
    inner: Arc<Mutex<Inner>>,
}

impl QuizSessionMachine {
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(Inner {
                phase: SessionPhase::Idle,
                attempt: QuizAttempt::default(),
                generation: 0,
            })),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            phase: inner.phase.clone(),
            attempt: inner.attempt.clone(),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase.clone()
    }

    pub async fn is_busy(&self) -> bool {
        matches!(self.inner.lock().await.phase, SessionPhase::Loading(_))
    }

    /// `(current question number, total questions)` while an attempt exists.
    pub async fn progress(&self) -> Option<(u32, u32)> {
        let inner = self.inner.lock().await;
        inner.attempt.attempt_id.as_ref().map(|_| {
            (
                inner.attempt.current_question_number,
                inner.attempt.total_questions,
            )
        })
    }

    pub async fn current_question(&self) -> Option<Question> {
        self.inner.lock().await.attempt.current_question.clone()
    }

    /// Starts a fresh attempt, discarding whatever was loaded before.
    pub async fn start(&self, level_id: &str) -> Result<Question, SessionError> {
        let level_id = level_id.trim();
        if level_id.is_empty() {
            return Err(SessionError::InvalidInput);
        }

        let generation = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.attempt = QuizAttempt {
                level_id: Some(level_id.to_string()),
                ..QuizAttempt::default()
            };
            inner.phase = SessionPhase::Loading(Operation::Start);
            inner.generation
        };

        tracing::info!("Starting quiz attempt for level: {}", level_id);

        let result = self.backend.start(level_id).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return Err(inner.discard(Operation::Start, generation));
        }

        let (attempt, first_question) = match result
            .map_err(SessionError::from)
            .and_then(|response| build_attempt(level_id, response))
        {
            Ok(built) => built,
            Err(err) => return Err(inner.fail(Operation::Start, err)),
        };

        tracing::info!(
            "Quiz attempt {} started: level={}, questions={}, hearts={}",
            attempt.attempt_id.as_deref().unwrap_or_default(),
            level_id,
            attempt.total_questions,
            attempt.hearts_remaining
        );
        record_attempt_event("started");

        inner.attempt = attempt;
        inner.phase = SessionPhase::Active;

        Ok(first_question)
    }

    /// Sends an answer for grading and applies the verdict.
    ///
    /// Nothing is mutated unless the backend answers with a well-formed
    /// response for the current generation.
    pub async fn submit_answer(
        &self,
        question_id: &str,
        user_answer: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let (generation, request) = {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                SessionPhase::Active => {}
                SessionPhase::Loading(_) => return Err(SessionError::Busy),
                _ => return Err(SessionError::NoActiveAttempt),
            }

            let level_id = inner
                .attempt
                .level_id
                .clone()
                .ok_or(SessionError::NoActiveAttempt)?;

            if let Some(current) = &inner.attempt.current_question {
                if current.id != question_id {
                    tracing::warn!(
                        "Answer submitted for question {} while {} is presented",
                        question_id,
                        current.id
                    );
                }
            }

            inner.phase = SessionPhase::Loading(Operation::Submit);
            (
                inner.generation,
                SubmitAnswerRequest {
                    level_id,
                    question_id: question_id.to_string(),
                    user_answer: user_answer.to_string(),
                },
            )
        };

        let result = self.backend.submit_answer(&request).await;

        let (outcome, teardown) = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                return Err(inner.discard(Operation::Submit, generation));
            }

            let response = match result {
                Ok(response) => response,
                Err(err) => return Err(inner.fail(Operation::Submit, err.into())),
            };

            let next_question = match validate_submit(&response) {
                Ok(next_question) => next_question,
                Err(err) => return Err(inner.fail(Operation::Submit, err.into())),
            };

            let outcome = apply_submit(&mut inner, request, &response, next_question);
            let teardown = if outcome.auto_abandoned {
                tracing::info!("Level failed with no hearts left, abandoning attempt");
                inner.begin_abandon()
            } else {
                None
            };
            (outcome, teardown)
        };

        if let Some((generation, level_id)) = teardown {
            self.finish_abandon(generation, &level_id).await;
        }

        Ok(outcome)
    }

    /// Tears down the current attempt. Never fails: the backend call is
    /// best-effort and local state is reset regardless.
    pub async fn abandon(&self) {
        let teardown = {
            let mut inner = self.inner.lock().await;
            // an earlier abandon is still in flight and nothing was loaded since
            if inner.phase == SessionPhase::Loading(Operation::Abandon) {
                return;
            }
            inner.begin_abandon()
        };

        if let Some((generation, level_id)) = teardown {
            self.finish_abandon(generation, &level_id).await;
        }
    }

    async fn finish_abandon(&self, generation: u64, level_id: &str) {
        match self.backend.abandon(level_id).await {
            Ok(response) => {
                tracing::info!(
                    "Quiz attempt abandoned: level={}, status={}",
                    level_id,
                    response.status
                );
            }
            Err(err) => {
                tracing::warn!("Failed to abandon level {} on server: {}", level_id, err);
                ABANDON_FAILURES_TOTAL.inc();
            }
        }
        record_attempt_event("abandoned");

        let mut inner = self.inner.lock().await;
        if inner.generation == generation {
            inner.phase = SessionPhase::Idle;
        }
    }
}

fn build_attempt(
    level_id: &str,
    response: StartQuizResponse,
) -> Result<(QuizAttempt, Question), SessionError> {
    let session = response.session;
    if session.total_questions == 0 {
        return Err(DataContractError::InvalidQuestionCount(session.total_questions).into());
    }

    let question = Question::try_from(response.first_question.question)?;

    let attempt = QuizAttempt {
        attempt_id: Some(response.attempt_id),
        level_id: Some(level_id.to_string()),
        hearts_remaining: session.hearts_remaining,
        total_questions: session.total_questions,
        current_question_number: session.current_question_number,
        current_question: Some(question.clone()),
        started_at: Some(Utc::now()),
        ..QuizAttempt::default()
    };

    Ok((attempt, question))
}

fn validate_submit(response: &SubmitAnswerResponse) -> Result<Option<Question>, DataContractError> {
    if response.quiz_complete.is_some() && response.level_failed {
        return Err(DataContractError::ConflictingOutcome);
    }

    response
        .next_question
        .as_ref()
        .map(|next| Question::try_from(next.question.clone()))
        .transpose()
}

fn apply_submit(
    inner: &mut Inner,
    request: SubmitAnswerRequest,
    response: &SubmitAnswerResponse,
    next_question: Option<Question>,
) -> SubmitOutcome {
    let attempt = &mut inner.attempt;
    let result = AnswerResult::from(response);

    attempt.hearts_remaining = response.hearts_remaining;

    let presented = attempt
        .current_question
        .as_ref()
        .filter(|question| question.id == request.question_id)
        .cloned();
    attempt.review.push(ReviewEntry {
        question: presented,
        user_answer: request.user_answer.clone(),
        result: result.clone(),
    });
    attempt.answers.push(SubmittedAnswer {
        question_id: request.question_id,
        user_answer: request.user_answer,
    });

    if let Some(question) = next_question {
        attempt.current_question = Some(question);
    }
    if let Some(number) = response
        .next_question
        .as_ref()
        .and_then(|next| next.session)
        .and_then(|session| session.current_question_number)
    {
        attempt.current_question_number = number;
    }

    attempt.last_answer_result = Some(result.clone());

    let outcome = match (response.quiz_complete, response.level_failed) {
        (Some(complete), _) => TerminalOutcome::Completed {
            score: complete.score,
        },
        (None, true) => TerminalOutcome::Failed,
        (None, false) => TerminalOutcome::None,
    };
    attempt.terminal_outcome = outcome;

    inner.phase = match outcome {
        TerminalOutcome::Completed { score } => {
            tracing::info!("Quiz completed with score {}", score);
            record_attempt_event("completed");
            SessionPhase::Completed
        }
        TerminalOutcome::Failed => {
            tracing::info!("Quiz level failed");
            record_attempt_event("failed");
            SessionPhase::Failed
        }
        TerminalOutcome::None => SessionPhase::Active,
    };

    record_answer(result.is_correct);

    SubmitOutcome {
        result,
        hearts_remaining: response.hearts_remaining,
        outcome,
        auto_abandoned: response.level_failed && response.hearts_remaining == 0,
    }
}
