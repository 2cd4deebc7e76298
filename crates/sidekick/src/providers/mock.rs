use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// A provider that replays pre-configured responses for testing. Clones
/// share the same response queue and call log.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    seen_tools: Arc<Mutex<Vec<Vec<Tool>>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            seen_tools: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The tool sets advertised on each completion request, in order
    pub fn seen_tools(&self) -> Vec<Vec<Tool>> {
        self.seen_tools.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        self.seen_tools.lock().unwrap().push(tools.to_vec());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
