use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::Role;
use super::tool::ToolCall;
use crate::errors::ToolResult;

/// A tool invocation the model asked for. The call itself may already be an
/// error (unparseable arguments, bad function name) which is preserved so it
/// can be echoed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub call: ToolResult<ToolCall>,
}

/// The outcome of a tool invocation, keyed by the request id. Successful
/// outputs are the provider's raw JSON, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub output: ToolResult<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { text: String },
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text { text: text.into() }
    }

    pub fn tool_request<S: Into<String>>(id: S, call: ToolResult<ToolCall>) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            call,
        })
    }

    pub fn tool_response<S: Into<String>>(id: S, output: ToolResult<Value>) -> Self {
        MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            output,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        match self {
            MessageContent::ToolRequest(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        match self {
            MessageContent::ToolResponse(response) => Some(response),
            _ => None,
        }
    }
}

/// A message to or from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    pub fn with_tool_request<S: Into<String>>(self, id: S, call: ToolResult<ToolCall>) -> Self {
        self.with_content(MessageContent::tool_request(id, call))
    }

    pub fn with_tool_response<S: Into<String>>(self, id: S, output: ToolResult<Value>) -> Self {
        self.with_content(MessageContent::tool_response(id, output))
    }

    /// All text content of the message, joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| content.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The tool requests contained in the message, if any
    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.content
            .iter()
            .filter_map(|content| content.as_tool_request())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message() {
        let message = Message::user().with_text("Hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.text(), "Hello");
        assert!(message.tool_requests().is_empty());
    }

    #[test]
    fn test_tool_request_roundtrip() {
        let message = Message::assistant()
            .with_tool_request("1", Ok(ToolCall::new("search", json!({"keywords": "rust"}))));

        let requests = message.tool_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].call.as_ref().unwrap().name, "search");

        let serialized = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&serialized).unwrap();
        assert_eq!(message, deserialized);
    }

    #[test]
    fn test_text_skips_tool_content() {
        let message = Message::user()
            .with_text("before")
            .with_tool_response("1", Ok(json!([{"title": "t"}])))
            .with_text("after");
        assert_eq!(message.text(), "before\nafter");
    }
}
