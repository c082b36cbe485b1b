#![allow(dead_code)]

use async_trait::async_trait;
use langquest_client::models::{
    AbandonResponse, StartQuizResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};
use langquest_client::services::{BackendError, QuizBackend};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Start(String),
    Submit(SubmitAnswerRequest),
    Abandon(String),
}

/// Scripted in-memory backend. Responses are handed out in the order they
/// were queued; an empty queue is reported as a server error.
#[derive(Default)]
pub struct FakeBackend {
    starts: Mutex<VecDeque<Result<StartQuizResponse, BackendError>>>,
    submits: Mutex<VecDeque<Result<SubmitAnswerResponse, BackendError>>>,
    fail_abandon: Mutex<bool>,
    calls: Mutex<Vec<BackendCall>>,
    start_gate: Mutex<Option<Arc<Notify>>>,
    submit_gate: Mutex<Option<Arc<Notify>>>,
    abandon_gate: Mutex<Option<Arc<Notify>>>,
    pub start_entered: Notify,
    pub submit_entered: Notify,
    pub abandon_entered: Notify,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_start(&self, response: Value) {
        let parsed = serde_json::from_value(response).expect("valid start response");
        self.starts.lock().unwrap().push_back(Ok(parsed));
    }

    pub fn queue_start_error(&self, err: BackendError) {
        self.starts.lock().unwrap().push_back(Err(err));
    }

    pub fn queue_submit(&self, response: Value) {
        let parsed = serde_json::from_value(response).expect("valid submit response");
        self.submits.lock().unwrap().push_back(Ok(parsed));
    }

    pub fn queue_submit_error(&self, err: BackendError) {
        self.submits.lock().unwrap().push_back(Err(err));
    }

    pub fn fail_abandon(&self) {
        *self.fail_abandon.lock().unwrap() = true;
    }

    /// Makes the next starts wait until the returned handle is notified.
    pub fn hold_starts(&self) -> Arc<Notify> {
        install_gate(&self.start_gate)
    }

    /// Makes the next submissions wait until the returned handle is notified.
    pub fn hold_submits(&self) -> Arc<Notify> {
        install_gate(&self.submit_gate)
    }

    /// Makes the next abandons wait until the returned handle is notified.
    pub fn hold_abandons(&self) -> Arc<Notify> {
        install_gate(&self.abandon_gate)
    }

    /// Lifts the start gate so later starts answer immediately.
    pub fn release_starts(&self) {
        self.start_gate.lock().unwrap().take();
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn abandon_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Abandon(level_id) => Some(level_id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl QuizBackend for FakeBackend {
    async fn start(&self, level_id: &str) -> Result<StartQuizResponse, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Start(level_id.to_string()));
        let response = self
            .starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("start")));

        self.start_entered.notify_one();
        wait_at(&self.start_gate).await;

        response
    }

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Submit(request.clone()));
        let response = self
            .submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("submit")));

        self.submit_entered.notify_one();
        wait_at(&self.submit_gate).await;

        response
    }

    async fn abandon(&self, level_id: &str) -> Result<AbandonResponse, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Abandon(level_id.to_string()));

        self.abandon_entered.notify_one();
        wait_at(&self.abandon_gate).await;

        if *self.fail_abandon.lock().unwrap() {
            return Err(BackendError::Transport("connection reset".to_string()));
        }
        Ok(AbandonResponse {
            status: "success".to_string(),
            message: "Attempt abandoned".to_string(),
        })
    }
}

fn install_gate(slot: &Mutex<Option<Arc<Notify>>>) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *slot.lock().unwrap() = Some(gate.clone());
    gate
}

async fn wait_at(slot: &Mutex<Option<Arc<Notify>>>) {
    let gate = slot.lock().unwrap().clone();
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

fn unscripted(operation: &str) -> BackendError {
    BackendError::Server {
        status: 500,
        message: format!("no scripted {} response", operation),
    }
}

pub fn question(id: &str, question_type: Value) -> Value {
    json!({
        "id": id,
        "type": question_type,
        "text": format!("Prompt for {}", id),
        "options": ["a", "b"]
    })
}

pub fn start_response(attempt_id: &str, total: u32, hearts: u32, first: Value) -> Value {
    json!({
        "attemptId": attempt_id,
        "session": {
            "totalQuestions": total,
            "heartsRemaining": hearts,
            "currentQuestionNumber": 1
        },
        "firstQuestion": { "question": first }
    })
}

/// Serves `router` on an ephemeral local port and returns the API base URL.
pub async fn spawn_api(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test api server");
    });
    format!("http://{}/api", addr)
}
