use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while resolving or executing a tool call. These are
/// serializable because they travel back to the model inside the thread,
/// where it can read the message and recover.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}

pub type ToolResult<T> = Result<T, ToolError>;
