use serde::{Deserialize, Serialize};

/// One payload of the outbound streaming protocol. Serialized untagged so
/// the wire shapes stay `{status, message}`, `{content}` and
/// `{error, details?}` with no discriminant field; variant order matters for
/// deserialization and mirrors that precedence.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum StreamEvent {
    Status {
        status: String,
        message: String,
    },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    Content {
        content: String,
    },
}

impl StreamEvent {
    pub fn status(status: &str, message: &str) -> Self {
        StreamEvent::Status {
            status: status.to_string(),
            message: message.to_string(),
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        StreamEvent::Content {
            content: content.into(),
        }
    }

    pub fn error(error: &str, details: Option<String>) -> Self {
        StreamEvent::Error {
            error: error.to_string(),
            details,
        }
    }

    /// Encode as one wire frame: `data: <json>\n\n`.
    pub fn to_frame(&self) -> String {
        // StreamEvent serialization cannot fail: all fields are strings.
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("data: {}\n\n", json)
    }
}

/// Terminal sentinel frame. The receiver stops reading when it sees this.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";
