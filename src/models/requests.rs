use serde::{Deserialize, Serialize};

/// One turn of conversation history as supplied by the frontend.
///
/// The role stays free-form text here; the history adapter decides
/// which roles are forwarded upstream and silently drops the rest, so
/// an unexpected role must not fail deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Chat API request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_camel_case_history_field() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"message":"hi","conversationHistory":[{"role":"user","content":"earlier"}]}"#,
        )
        .unwrap();

        assert_eq!(request.message, "hi");
        assert_eq!(request.conversation_history.len(), 1);
        assert_eq!(request.conversation_history[0].role, "user");
    }

    #[test]
    fn history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(request.conversation_history.is_empty());
    }
}
