use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Shape a client-supplied conversation into the sequence the inference
/// provider accepts: one leading system message, then strictly alternating
/// user/assistant turns.
///
/// Permissive on purpose: turns with unknown roles and turns that repeat the
/// previous role are dropped silently rather than failing the request. The
/// UI already sends one user prompt per turn, so anything filtered here is
/// either a duplicate submission or malformed input.
pub fn normalize(turns: &[ChatMessage], system_prompt: &str) -> Vec<ChatMessage> {
    let mut formatted = vec![ChatMessage::new("system", system_prompt)];
    let mut last_role = "system";

    for turn in turns {
        if turn.role != "user" && turn.role != "assistant" {
            continue;
        }
        if turn.role == last_role {
            eprintln!("Skipping duplicate role: {}", turn.role);
            continue;
        }
        formatted.push(turn.clone());
        last_role = turn.role.as_str();
    }

    formatted
}

/// Re-check a normalized sequence before submission. A violation here means
/// a normalizer bug or adversarial input, so it is surfaced as a client
/// error rather than silently corrected.
pub fn validate_alternation(messages: &[ChatMessage]) -> bool {
    let Some(first) = messages.first() else {
        return false;
    };
    if first.role != "system" {
        return false;
    }

    for pair in messages.windows(2) {
        let (current, next) = (&pair[0].role, &pair[1].role);
        if current == "system" || next == "system" {
            continue;
        }
        if current == next {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.role.as_str()).collect()
    }

    #[test]
    fn single_user_message_gets_system_prefix() {
        let turns = vec![ChatMessage::new("user", "hello")];
        let normalized = normalize(&turns, "default prompt");

        assert_eq!(roles(&normalized), ["system", "user"]);
        assert_eq!(normalized[0].content, "default prompt");
        assert_eq!(normalized[1].content, "hello");
        assert!(validate_alternation(&normalized));
    }

    #[test]
    fn duplicate_roles_are_dropped() {
        let turns = vec![
            ChatMessage::new("user", "first"),
            ChatMessage::new("user", "second"),
            ChatMessage::new("assistant", "reply"),
            ChatMessage::new("assistant", "reply again"),
            ChatMessage::new("user", "third"),
        ];
        let normalized = normalize(&turns, "sys");

        assert_eq!(roles(&normalized), ["system", "user", "assistant", "user"]);
        assert_eq!(normalized[1].content, "first");
        assert_eq!(normalized[3].content, "third");
    }

    #[test]
    fn extra_system_messages_are_dropped() {
        let turns = vec![
            ChatMessage::new("system", "sneaky"),
            ChatMessage::new("user", "hi"),
            ChatMessage::new("tool", "output"),
            ChatMessage::new("assistant", "hello"),
        ];
        let normalized = normalize(&turns, "sys");

        assert_eq!(roles(&normalized), ["system", "user", "assistant"]);
    }

    #[test]
    fn normalized_output_always_alternates() {
        let turns = vec![
            ChatMessage::new("assistant", "a"),
            ChatMessage::new("assistant", "b"),
            ChatMessage::new("user", "c"),
            ChatMessage::new("user", "d"),
            ChatMessage::new("assistant", "e"),
        ];
        let normalized = normalize(&turns, "sys");

        for pair in normalized.windows(2) {
            if pair[0].role != "system" && pair[1].role != "system" {
                assert_ne!(pair[0].role, pair[1].role);
            }
        }
        assert!(validate_alternation(&normalized));
    }

    #[test]
    fn validator_rejects_empty_sequence() {
        assert!(!validate_alternation(&[]));
    }

    #[test]
    fn validator_rejects_missing_system_prefix() {
        let messages = vec![
            ChatMessage::new("user", "hi"),
            ChatMessage::new("assistant", "hello"),
        ];
        assert!(!validate_alternation(&messages));
    }

    #[test]
    fn validator_rejects_consecutive_user_turns() {
        let messages = vec![
            ChatMessage::new("system", "sys"),
            ChatMessage::new("user", "a"),
            ChatMessage::new("user", "b"),
        ];
        assert!(!validate_alternation(&messages));
    }

    #[test]
    fn validator_rejects_consecutive_assistant_turns() {
        let messages = vec![
            ChatMessage::new("system", "sys"),
            ChatMessage::new("user", "a"),
            ChatMessage::new("assistant", "b"),
            ChatMessage::new("assistant", "c"),
        ];
        assert!(!validate_alternation(&messages));
    }
}
