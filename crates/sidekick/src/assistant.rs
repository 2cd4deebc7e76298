use anyhow::Result;
use futures::future::join_all;
use serde_json::Value;

use crate::errors::{ToolError, ToolResult};
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::thread::Thread;
use crate::toolkit::Toolkit;

/// The conversational agent: a remote model plus the toolkits it may use.
///
/// The assistant owns no conversation state; it operates on a `Thread` passed
/// in by the caller and only ever appends to it.
pub struct Assistant {
    name: String,
    instructions: String,
    toolkits: Vec<Box<dyn Toolkit>>,
    provider: Box<dyn Provider>,
}

impl Assistant {
    pub fn new<N, I>(provider: Box<dyn Provider>, name: N, instructions: I) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            toolkits: Vec::new(),
            provider,
        }
    }

    pub fn add_toolkit(&mut self, toolkit: Box<dyn Toolkit>) {
        self.toolkits.push(toolkit);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The union of all toolkit tools, advertised unchanged on every
    /// completion request
    pub fn tools(&self) -> Vec<Tool> {
        self.toolkits
            .iter()
            .flat_map(|toolkit| toolkit.tools().iter().cloned())
            .collect()
    }

    fn system_prompt(&self) -> String {
        let mut prompt = self.instructions.clone();
        for toolkit in &self.toolkits {
            prompt.push_str("\n\n");
            prompt.push_str(toolkit.instructions());
        }
        prompt
    }

    /// The toolkit that registered a tool under this name, first match wins
    fn toolkit_for(&self, tool_name: &str) -> Option<&dyn Toolkit> {
        self.toolkits
            .iter()
            .find(|toolkit| toolkit.tools().iter().any(|tool| tool.name == tool_name))
            .map(|toolkit| &**toolkit)
    }

    async fn dispatch_tool_call(&self, call: ToolResult<ToolCall>) -> ToolResult<Value> {
        let call = call?;
        let toolkit = self
            .toolkit_for(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        toolkit.call(call).await
    }

    /// Run the assistant against the thread until it stops asking for tools.
    ///
    /// Each round appends the assistant message; when it carries tool
    /// requests they are dispatched concurrently and a single user message
    /// with all tool responses is appended before the next completion.
    /// Failed tool calls become error responses the model can read.
    pub async fn run(&self, thread: &mut Thread) -> Result<()> {
        let tools = self.tools();
        let system_prompt = self.system_prompt();

        loop {
            let (response, _usage) = self
                .provider
                .complete(&system_prompt, thread.messages(), &tools)
                .await?;

            let requests: Vec<(String, ToolResult<ToolCall>)> = response
                .tool_requests()
                .into_iter()
                .map(|request| (request.id.clone(), request.call.clone()))
                .collect();

            thread.add(response);

            if requests.is_empty() {
                break;
            }

            let futures: Vec<_> = requests
                .iter()
                .map(|(_, call)| self.dispatch_tool_call(call.clone()))
                .collect();
            let outputs = join_all(futures).await;

            let mut tool_message = Message::user();
            for ((id, _), output) in requests.into_iter().zip(outputs) {
                tool_message = tool_message.with_tool_response(id, output);
            }
            thread.add(tool_message);
        }

        Ok(())
    }

    /// The chat adapter: append the user message, run, hand back the text of
    /// the last message. The widget's visible history is not consulted; the
    /// thread is the source of truth.
    pub async fn chat(&self, thread: &mut Thread, message: &str) -> Result<String> {
        thread.add(Message::user().with_text(message));
        self.run(thread).await?;
        Ok(thread.last_text().unwrap_or_default())
    }
}
