use serde::{Deserialize, Serialize};

use crate::types::{Message, Transcript};

/// The body a session POSTs to the proxy endpoint: the whole transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Every message of the conversation so far, oldest first.
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Create a request carrying the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl From<&Transcript> for ChatRequest {
    fn from(transcript: &Transcript) -> Self {
        Self::new(transcript.messages().to_vec())
    }
}

/// The body the proxy endpoint returns on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// A fixed, human-readable message.
    pub error: String,
}

impl ErrorBody {
    /// Create an error body with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_shape() {
        let request = ChatRequest::new(vec![Message::user("hello")]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"messages": [{"role": "user", "content": "hello"}]})
        );
    }

    #[test]
    fn error_body_wire_shape() {
        assert_eq!(
            serde_json::to_value(ErrorBody::new("boom")).unwrap(),
            json!({"error": "boom"})
        );
    }
}
