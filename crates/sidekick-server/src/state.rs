use std::sync::Arc;
use tokio::sync::Mutex;

use sidekick::assistant::Assistant;
use sidekick::thread::Thread;

/// Shared application state: the assistant and the single process-lifetime
/// conversation thread. The mutex serializes chat runs; no two runs against
/// the thread execute concurrently.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub thread: Arc<Mutex<Thread>>,
    pub examples: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(assistant: Assistant, examples: Vec<String>) -> Self {
        Self {
            assistant: Arc::new(assistant),
            thread: Arc::new(Mutex::new(Thread::new())),
            examples: Arc::new(examples),
        }
    }

    /// The widget title shown above the conversation
    pub fn title(&self) -> String {
        format!("Chat with {}", self.assistant.name())
    }
}
