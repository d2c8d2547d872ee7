use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Message;

/// Body of an outbound chat-completion request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest<'a> {
    /// The model identifier.
    pub model: &'a str,

    /// The conversation, forwarded verbatim.
    pub messages: &'a [Message],
}

impl<'a> CompletionRequest<'a> {
    /// Create a request for `model` over `messages`.
    pub fn new(model: &'a str, messages: &'a [Message]) -> Self {
        Self { model, messages }
    }
}

/// Body of a chat-completion response.
///
/// Only the fields this crate reads are modeled; everything else the
/// provider sends is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CompletionResponse {
    /// Provider-assigned identifier of the completion.
    #[serde(default)]
    pub id: Option<String>,

    /// The model that produced the completion.
    #[serde(default)]
    pub model: Option<String>,

    /// Candidate replies, best first.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this candidate in the response.
    #[serde(default)]
    pub index: u32,

    /// The candidate message.
    pub message: ChoiceMessage,

    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message carried by a [`Choice`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    /// Role reported by the provider; always treated as assistant.
    #[serde(default)]
    pub role: Option<String>,

    /// Reply text.  Providers send `null` here for tool-only turns.
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Consumes the response and returns its first candidate as an assistant
    /// message.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if there is no candidate or the first
    /// candidate carries no content.
    pub fn into_reply(self) -> Result<Message> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            Error::serialization("completion response contained no choices", None)
        })?;
        let content = choice.message.content.ok_or_else(|| {
            Error::serialization("first completion choice has no content", None)
        })?;
        Ok(Message::assistant(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_shape() {
        let messages = vec![Message::user("hello"), Message::assistant("hi")];
        let request = CompletionRequest::new("deepseek-chat", &messages);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "deepseek-chat",
                "messages": [
                    {"role": "user", "content": "hello"},
                    {"role": "assistant", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn first_choice_wins() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "id": "cmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hi there"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "hello!"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }))
        .unwrap();
        assert_eq!(response.choices.len(), 2);
        assert_eq!(response.into_reply().unwrap(), Message::assistant("hi there"));
    }

    #[test]
    fn empty_choices_is_malformed() {
        let response: CompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(response.into_reply().unwrap_err().is_serialization());

        let response: CompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.into_reply().is_err());
    }

    #[test]
    fn null_content_is_malformed() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(response.into_reply().unwrap_err().is_serialization());
    }

    #[test]
    fn provider_role_is_ignored() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "bot", "content": "ok"}}]
        }))
        .unwrap();
        assert_eq!(response.into_reply().unwrap(), Message::assistant("ok"));
    }
}
