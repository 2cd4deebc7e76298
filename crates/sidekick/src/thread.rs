use serde::{Deserialize, Serialize};

use crate::models::message::Message;

/// The conversation transcript for one assistant session. Append-only: the
/// assistant and the chat adapter only ever push to it, and it lives for the
/// lifetime of the process. Nothing is persisted.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Thread {
    messages: Vec<Message>,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Text of the most recently added message
    pub fn last_text(&self) -> Option<String> {
        self.messages.last().map(|message| message.text())
    }
}
