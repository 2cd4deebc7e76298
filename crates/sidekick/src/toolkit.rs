use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ToolResult;
use crate::models::tool::{Tool, ToolCall};

/// A named group of tools the assistant can expose to the model.
///
/// The descriptors returned by `tools()` must not change between calls: the
/// assistant advertises the same set on every completion request.
#[async_trait]
pub trait Toolkit: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Guidance appended to the assistant instructions when the toolkit is
    /// registered
    fn instructions(&self) -> &str;

    fn tools(&self) -> &[Tool];

    /// Execute one of this toolkit's tools. The output is raw JSON handed
    /// back to the model unmodified.
    async fn call(&self, tool_call: ToolCall) -> ToolResult<Value>;
}
