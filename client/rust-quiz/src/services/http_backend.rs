use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::Config;
use crate::metrics::track_backend_request;
use crate::models::{
    AbandonResponse, StartQuizResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

use super::backend::{BackendError, QuizBackend};

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Characters escaped when a level id is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// `QuizBackend` over the product's REST API.
pub struct HttpQuizBackend {
    http_client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpQuizBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn level_url(&self, level_id: &str, action: &str) -> String {
        format!(
            "{}/quiz/levels/{}/{}",
            self.base_url,
            utf8_percent_encode(level_id, PATH_SEGMENT),
            action
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let trace_id = Uuid::new_v4().to_string();
        tracing::debug!(
            "Calling quiz API: operation={}, trace_id={}",
            operation,
            trace_id
        );

        track_backend_request(operation, async {
            let response = self
                .authorize(request)
                .header(TRACE_ID_HEADER, &trace_id)
                .send()
                .await
                .map_err(|e| {
                    tracing::warn!(
                        "Quiz API {} transport error (trace_id={}): {}",
                        operation,
                        trace_id,
                        e
                    );
                    BackendError::Transport(e.to_string())
                })?;

            decode_response(response).await
        })
        .await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(BackendError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Pulls a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl QuizBackend for HttpQuizBackend {
    async fn start(&self, level_id: &str) -> Result<StartQuizResponse, BackendError> {
        let request = self.http_client.post(self.level_url(level_id, "start"));
        self.send("start", request).await
    }

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, BackendError> {
        let builder = self
            .http_client
            .post(self.level_url(&request.level_id, "answers"))
            .json(request);
        self.send("submit_answer", builder).await
    }

    async fn abandon(&self, level_id: &str) -> Result<AbandonResponse, BackendError> {
        let request = self.http_client.post(self.level_url(level_id, "abandon"));
        self.send("abandon", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ids_are_escaped_in_paths() {
        let config = Config {
            api_base_url: "http://localhost:5000/api/".to_string(),
            ..Config::default()
        };
        let backend = HttpQuizBackend::new(&config).unwrap();

        assert_eq!(
            backend.level_url("unit 1/a", "start"),
            "http://localhost:5000/api/quiz/levels/unit%201%2Fa/start"
        );
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"Level locked"}"#), "Level locked");
        assert_eq!(error_message(r#"{"error":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
