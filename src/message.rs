//! Conversation data types
//!
//! These types are shared by the terminal front end and the one-shot CLI
//! commands and don't depend on any UI framework. Their serialized form is
//! the JSON array the web client keeps in `localStorage`.

use serde::{Deserialize, Serialize};

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

/// The role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label shown in front of a message
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered, append-only message history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_like_the_web_client() {
        let conversation = Conversation::from(vec![
            Message::user("hello"),
            Message::assistant("hi there"),
        ]);

        let json = conversation.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"role":"user","content":"hello"},{"role":"assistant","content":"hi there"}]"#
        );
    }

    #[test]
    fn parses_stored_history() {
        let raw = r#"[{"role":"user","content":"oil type?"},{"role":"assistant","content":"0W-16"}]"#;
        let conversation = Conversation::from_json(raw).unwrap();

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.as_slice()[0].role(), Role::User);
        assert_eq!(conversation.as_slice()[1].content(), "0W-16");
    }

    #[test]
    fn rejects_unknown_roles() {
        let raw = r#"[{"role":"system","content":"x"}]"#;
        assert!(Conversation::from_json(raw).is_err());
    }

    #[test]
    fn push_keeps_arrival_order() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("first"));
        conversation.push(Message::user("first"));
        conversation.push(Message::assistant("second"));

        let contents: Vec<&str> = conversation.iter().map(Message::content).collect();
        assert_eq!(contents, vec!["first", "first", "second"]);
    }
}
