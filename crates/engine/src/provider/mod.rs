pub mod extract;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::RunpodConfig;
use caregate_shared::ChatMessage;

/// One job submission, built once per request and sent verbatim.
#[derive(Serialize, Clone, Debug)]
pub struct SubmitRequest {
    pub input: JobInput,
}

#[derive(Serialize, Clone, Debug)]
pub struct JobInput {
    pub messages: Vec<ChatMessage>,
    pub sampling_params: SamplingParams,
}

#[derive(Serialize, Clone, Debug)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl SubmitRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            input: JobInput {
                messages,
                sampling_params: SamplingParams {
                    temperature: 0.7,
                    max_tokens: 2048,
                },
            },
        }
    }
}

/// Response to a submit call. The provider either answers directly
/// (`output` present) or defers with `status: "IN_QUEUE"` and a job id.
#[derive(Deserialize, Debug)]
pub struct SubmitResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Option<Value>,
}

/// Response to a status poll. `error` is kept loose because failed jobs
/// report either a string or a structured object.
#[derive(Deserialize, Debug)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl StatusResponse {
    pub fn error_detail(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Unknown error occurred".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("RunPod API error: {status} - {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Seam to the remote queue-backed service. A trait so the job runner can be
/// exercised against stubs.
#[allow(async_fn_in_trait)]
pub trait Provider {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, ProviderError>;
    async fn status(&self, job_id: &str) -> Result<StatusResponse, ProviderError>;
}

pub struct RunpodClient {
    client: reqwest::Client,
    config: RunpodConfig,
}

impl RunpodClient {
    pub fn new(client: reqwest::Client, config: RunpodConfig) -> Self {
        Self { client, config }
    }
}

impl Provider for RunpodClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, ProviderError> {
        let response = self
            .client
            .post(self.config.run_url())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn status(&self, job_id: &str) -> Result<StatusResponse, ProviderError> {
        let response = self
            .client
            .get(self.config.status_url(job_id))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submit_request_carries_default_sampling_params() {
        let request = SubmitRequest::new(vec![ChatMessage::new("user", "hello")]);
        let payload = serde_json::to_value(&request).unwrap();

        assert_eq!(
            payload,
            json!({
                "input": {
                    "messages": [{ "role": "user", "content": "hello" }],
                    "sampling_params": { "temperature": 0.7, "max_tokens": 2048 }
                }
            })
        );
    }

    #[test]
    fn status_error_detail_prefers_string() {
        let status: StatusResponse =
            serde_json::from_value(json!({ "status": "FAILED", "error": "oom" })).unwrap();
        assert_eq!(status.error_detail(), "oom");
    }

    #[test]
    fn status_error_detail_stringifies_objects() {
        let status: StatusResponse =
            serde_json::from_value(json!({ "status": "FAILED", "error": { "code": 137 } }))
                .unwrap();
        assert_eq!(status.error_detail(), r#"{"code":137}"#);
    }

    #[test]
    fn status_error_detail_falls_back_when_absent() {
        let status: StatusResponse =
            serde_json::from_value(json!({ "status": "FAILED" })).unwrap();
        assert_eq!(status.error_detail(), "Unknown error occurred");
    }
}
