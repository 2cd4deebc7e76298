use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the assistant may decide to invoke during a run. The model
/// selects tools from the name, the natural-language description and the
/// JSON schema of the parameters; nothing else is exchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    /// JSON schema describing the accepted parameters
    pub parameters: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A concrete invocation requested by the model: which tool, with which
/// arguments. Arguments are whatever JSON the model produced; the tool is
/// responsible for picking out the fields it declared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
