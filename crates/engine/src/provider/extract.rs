use serde::Deserialize;
use serde_json::Value;

/// Returned when no known shape matches; the provider's output shape is not
/// under our control, so extraction degrades instead of erroring.
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I couldn't generate a proper response. Please try rephrasing your question.";

// The known output shapes, tried in order. Unknown extra fields are ignored,
// which is what gives the chat-completion shape precedence over a flat
// `content` field sitting next to it.

#[derive(Deserialize)]
struct ChatCompletionShape {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: OutputMessage,
}

#[derive(Deserialize)]
struct NestedShape {
    message: OutputMessage,
}

#[derive(Deserialize)]
struct OutputMessage {
    content: String,
}

#[derive(Deserialize)]
struct FlatShape {
    content: String,
}

/// Best-effort plain-text answer from whatever the provider returned as the
/// job output. First matching shape with non-empty content wins.
pub fn extract_content(output: &Value) -> String {
    if let Ok(shape) = ChatCompletionShape::deserialize(output) {
        if let Some(choice) = shape.choices.into_iter().next() {
            if !choice.message.content.is_empty() {
                return choice.message.content;
            }
        }
    }

    if let Ok(shape) = NestedShape::deserialize(output) {
        if !shape.message.content.is_empty() {
            return shape.message.content;
        }
    }

    if let Ok(shape) = FlatShape::deserialize(output) {
        if !shape.content.is_empty() {
            return shape.content;
        }
    }

    if let Value::String(text) = output {
        if !text.is_empty() {
            return text.clone();
        }
    }

    FALLBACK_ANSWER.to_string()
}
