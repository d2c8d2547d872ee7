use std::fmt;

use serde::{Deserialize, Serialize};

/// Role type for a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a conversation.
///
/// Messages are never edited after construction; a conversation grows by
/// appending new ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: MessageRole,

    /// The text of the message.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Returns true if this message was written by the user.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serializes_role_lowercase() {
        let message = Message::user("hello");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({"role": "user", "content": "hello"})
        );

        let message = Message::assistant("hi there");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({"role": "assistant", "content": "hi there"})
        );
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let result =
            serde_json::from_value::<Message>(json!({"role": "system", "content": "be terse"}));
        assert!(result.is_err());
    }

    #[test]
    fn role_display() {
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert!(Message::user("x").is_user());
        assert!(!Message::assistant("x").is_user());
    }
}
