use axum::{
    body::Body,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::server::AppState;
use super::types::*;
use crate::config::RunpodConfig;
use crate::job;
use crate::prompt;
use crate::provider::{RunpodClient, SubmitRequest};
use crate::stream::StreamWriter;
use caregate_shared::messages::{normalize, validate_alternation};

/// Streaming chat endpoint. Validates everything it can before opening the
/// stream; once the stream is open, every failure is delivered as an error
/// frame rather than an HTTP status.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let config = match RunpodConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let system_prompt =
        prompt::build_system_prompt(&config.system_prompt, req.patient_history.as_ref());
    let formatted = normalize(&req.messages, &system_prompt);

    if !validate_alternation(&formatted) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid message format",
                "details": "Messages must alternate between user and assistant roles"
            })),
        )
            .into_response();
    }

    let request = SubmitRequest::new(formatted);
    let provider = RunpodClient::new(state.client.clone(), config);

    let (tx, rx) = mpsc::channel::<String>(64);
    let writer = StreamWriter::new(tx);
    let trace = state.trace.clone();

    // The driver owns the sending half; when it returns, the channel closes
    // and the response body ends.
    tokio::spawn(async move {
        job::run_job(&provider, request, writer, trace.as_ref()).await;
    });

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));
    (
        [
            (http::header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (http::header::CACHE_CONTROL, "no-cache"),
            (http::header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}

/// Non-streaming referral endpoint: one submit, direct extraction, no
/// polling.
pub async fn handle_referral(
    State(state): State<AppState>,
    Json(req): Json<ReferralRequest>,
) -> impl IntoResponse {
    let config = match RunpodConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            );
        }
    };

    let base_prompt = config.system_prompt.clone();
    let provider = RunpodClient::new(state.client.clone(), config);

    match job::run_referral(&provider, &base_prompt, &req.patient_history, &req.symptoms).await {
        Ok(recommendation) => (
            StatusCode::OK,
            Json(json!(ReferralResponse { recommendation })),
        ),
        Err(e) => {
            eprintln!("Referral API error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process referral request" })),
            )
        }
    }
}

pub async fn health_check() -> &'static str {
    "Caregate is running"
}
