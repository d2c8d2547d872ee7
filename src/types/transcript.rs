use serde::{Deserialize, Serialize};

use crate::types::Message;

/// The ordered list of turns exchanged in one session.
///
/// A transcript only ever grows.  Order is conversation order and duplicate
/// messages are allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the end of the transcript.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the messages in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no message has been exchanged yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates over the messages in conversation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order_and_duplicates() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.push(Message::user("again"));
        transcript.push(Message::assistant("ok"));
        transcript.push(Message::user("again"));

        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.messages(),
            &[
                Message::user("again"),
                Message::assistant("ok"),
                Message::user("again"),
            ]
        );
        assert_eq!(transcript.last(), Some(&Message::user("again")));
    }

    #[test]
    fn serializes_as_a_plain_array() {
        let transcript = Transcript::from(vec![Message::user("hello")]);
        assert_eq!(
            serde_json::to_value(&transcript).unwrap(),
            serde_json::json!([{"role": "user", "content": "hello"}])
        );
    }
}
