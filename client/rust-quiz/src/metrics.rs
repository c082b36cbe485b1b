use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // Backend API Metrics
    pub static ref BACKEND_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_backend_requests_total",
        "Total number of quiz API requests",
        &["operation", "status"]
    )
    .unwrap();

    pub static ref BACKEND_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "quiz_backend_request_duration_seconds",
        "Quiz API request duration in seconds",
        &["operation"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Session Metrics
    pub static ref QUIZ_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_attempts_total",
        "Quiz attempts by lifecycle event",
        &["event"]
    )
    .unwrap();

    pub static ref ANSWERS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_answers_submitted_total",
        "Total number of answers submitted",
        &["correct"]
    )
    .unwrap();

    pub static ref STALE_RESPONSES_DISCARDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_stale_responses_discarded_total",
        "Backend responses dropped because a newer attempt superseded them",
        &["operation"]
    )
    .unwrap();

    pub static ref ABANDON_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "quiz_abandon_failures_total",
        "Best-effort abandon calls that failed"
    )
    .unwrap();

    // Word game
    pub static ref HANGMAN_GAMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hangman_games_total",
        "Finished word-guessing games",
        &["result"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: time a backend call and count its outcome
pub async fn track_backend_request<F, T, E>(operation: &str, future: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    BACKEND_REQUESTS_TOTAL
        .with_label_values(&[operation, status])
        .inc();

    BACKEND_REQUEST_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration);

    result
}

pub fn record_attempt_event(event: &str) {
    QUIZ_ATTEMPTS_TOTAL.with_label_values(&[event]).inc();
}

pub fn record_answer(is_correct: bool) {
    let label = if is_correct { "true" } else { "false" };
    ANSWERS_SUBMITTED_TOTAL.with_label_values(&[label]).inc();
}

pub fn record_stale_response(operation: &str) {
    STALE_RESPONSES_DISCARDED_TOTAL
        .with_label_values(&[operation])
        .inc();
}
