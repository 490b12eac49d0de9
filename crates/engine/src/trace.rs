use serde::Serialize;

/// One structured record per state transition of the job lifecycle. This is
/// server-side observability only; it never reaches the client protocol.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    SubmitStarted { messages: usize },
    JobQueued { job_id: String },
    DirectResult,
    PollAttempt { attempt: u32, status: String },
    PollTransportError { attempt: u32, error: String },
    JobCompleted { attempts: u32 },
    JobFailed { detail: String },
    PollTimeout { attempts: u32 },
    TransportError { status: Option<u16>, detail: String },
    UnexpectedFormat,
    StreamStarted { chunks: usize },
    StreamFinished,
}

/// Capability handed to the request orchestration; implementations decide
/// where records go.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// Default sink: one JSON line per record on stdout.
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&self, event: TraceEvent) {
        if let Ok(json) = serde_json::to_string(&event) {
            println!("trace {}", json);
        }
    }
}

#[cfg(test)]
pub struct RecordingSink(pub std::sync::Mutex<Vec<TraceEvent>>);

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self(std::sync::Mutex::new(Vec::new()))
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.0.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl TraceSink for RecordingSink {
    fn record(&self, event: TraceEvent) {
        self.0.lock().unwrap().push(event);
    }
}
