// Chat transcript: the ordered message history sent to the model on every turn.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Local display time, `HH:MM:SS`. Never sent to the model.
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// Append-only message history. Grows without bound for the life of a session.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Seeded with the system prompt and the assistant greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![
                ChatMessage::new(Role::System, constants::SYSTEM_PROMPT.as_str()),
                ChatMessage::new(Role::Assistant, constants::GREETING),
            ],
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// What a user gets to see: everything except the system prompt.
    pub fn visible(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// Drops messages past `len`. Only used to undo a turn whose model call failed.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }
}
