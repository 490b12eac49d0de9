use tokio::time::{Duration, sleep};

use crate::prompt::{self, PatientHistory};
use crate::provider::extract::extract_content;
use crate::provider::{Provider, ProviderError, SubmitRequest};
use crate::stream::{StreamWriter, stream_answer};
use crate::trace::{TraceEvent, TraceSink};
use caregate_shared::ChatMessage;

/// Poll ceiling and interval bound the total wait at 5 minutes, which has to
/// stay under the platform's request deadline.
pub const MAX_POLL_ATTEMPTS: u32 = 60;
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Terminal classification of one job run. Every variant has already closed
/// the stream by the time it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    Timeout,
    TransportError,
    UnexpectedFormat,
}

/// Drive one job from submission to a terminal state, relaying progress and
/// the final answer into the open stream.
pub async fn run_job<P: Provider>(
    provider: &P,
    request: SubmitRequest,
    writer: StreamWriter,
    trace: &dyn TraceSink,
) -> JobOutcome {
    trace.record(TraceEvent::SubmitStarted {
        messages: request.input.messages.len(),
    });

    let initial = match provider.submit(&request).await {
        Ok(response) => response,
        Err(ProviderError::Http {
            status,
            status_text,
            body,
        }) => {
            trace.record(TraceEvent::TransportError {
                status: Some(status),
                detail: body.clone(),
            });
            writer
                .error(
                    &format!("RunPod API error: {} - {}", status, status_text),
                    Some(body),
                )
                .await;
            return JobOutcome::TransportError;
        }
        Err(err) => {
            trace.record(TraceEvent::TransportError {
                status: None,
                detail: err.to_string(),
            });
            writer
                .error("Stream processing failed", Some(err.to_string()))
                .await;
            return JobOutcome::TransportError;
        }
    };

    match (initial.status.as_deref(), initial.id, initial.output) {
        (Some("IN_QUEUE"), Some(job_id), _) => {
            poll_until_terminal(provider, &job_id, &writer, trace).await
        }
        (_, _, Some(output)) => {
            trace.record(TraceEvent::DirectResult);
            deliver(&output, &writer, trace).await;
            JobOutcome::Completed
        }
        _ => {
            trace.record(TraceEvent::UnexpectedFormat);
            writer
                .error(
                    "Unexpected response format",
                    Some("No output or queue ID received".to_string()),
                )
                .await;
            JobOutcome::UnexpectedFormat
        }
    }
}

async fn poll_until_terminal<P: Provider>(
    provider: &P,
    job_id: &str,
    writer: &StreamWriter,
    trace: &dyn TraceSink,
) -> JobOutcome {
    trace.record(TraceEvent::JobQueued {
        job_id: job_id.to_string(),
    });
    writer
        .status("queued", "Your request is in queue, please wait...")
        .await;

    for attempt in 1..=MAX_POLL_ATTEMPTS {
        sleep(POLL_INTERVAL).await;

        let status = match provider.status(job_id).await {
            Ok(status) => status,
            Err(err) => {
                // Transient status-channel failures only consume the attempt.
                eprintln!("Status check failed for job {}: {}", job_id, err);
                trace.record(TraceEvent::PollTransportError {
                    attempt,
                    error: err.to_string(),
                });
                continue;
            }
        };
        trace.record(TraceEvent::PollAttempt {
            attempt,
            status: status.status.clone(),
        });

        match status.status.as_str() {
            // COMPLETED without an output is treated as still transient.
            "COMPLETED" => {
                if let Some(output) = status.output {
                    trace.record(TraceEvent::JobCompleted { attempts: attempt });
                    writer
                        .status("processing", "Processing your response...")
                        .await;
                    deliver(&output, writer, trace).await;
                    return JobOutcome::Completed;
                }
            }
            "FAILED" => {
                let detail = status.error_detail();
                trace.record(TraceEvent::JobFailed {
                    detail: detail.clone(),
                });
                writer.error("Job processing failed", Some(detail)).await;
                return JobOutcome::Failed;
            }
            "IN_PROGRESS" => {
                writer
                    .status("processing", "Your request is being processed...")
                    .await;
            }
            // Provider-specific transient states are tolerated silently.
            _ => {}
        }
    }

    trace.record(TraceEvent::PollTimeout {
        attempts: MAX_POLL_ATTEMPTS,
    });
    writer
        .error(
            "Request timeout",
            Some("The request took too long to process. Please try again.".to_string()),
        )
        .await;
    JobOutcome::Timeout
}

/// The referral variant: one submit, direct extraction, no polling and no
/// stream. An answer shape the extractor cannot place still resolves to its
/// fallback text; only a missing `output` maps to the placeholder reply.
pub async fn run_referral<P: Provider>(
    provider: &P,
    base_prompt: &str,
    history: &PatientHistory,
    symptoms: &str,
) -> Result<String, ProviderError> {
    let messages = referral_messages(base_prompt, history, symptoms);
    let response = provider.submit(&SubmitRequest::new(messages)).await?;

    Ok(match response.output {
        Some(output) => extract_content(&output),
        None => "No response received".to_string(),
    })
}

fn referral_messages(
    base_prompt: &str,
    history: &PatientHistory,
    symptoms: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(
            "system",
            format!(
                "{} Focus on providing a detailed doctor referral recommendation with specific reasoning, recommended specialists, urgency level, and next steps.",
                base_prompt
            ),
        ),
        ChatMessage::new(
            "system",
            format!(
                "Patient History: {}",
                prompt::format_patient_history(history)
            ),
        ),
        ChatMessage::new(
            "user",
            format!(
                "Based on the patient history and current symptoms: {}, please provide a comprehensive doctor referral recommendation including: 1) Recommended specialist(s) 2) Urgency level 3) Specific reasoning 4) Suggested tests or preparations 5) ICD10 and CPT codes if applicable",
                symptoms
            ),
        ),
    ]
}

async fn deliver(output: &serde_json::Value, writer: &StreamWriter, trace: &dyn TraceSink) {
    let content = extract_content(output);
    trace.record(TraceEvent::StreamStarted {
        chunks: content.split(' ').count(),
    });
    stream_answer(writer, &content).await;
    trace.record(TraceEvent::StreamFinished);
}
