//! The objects passed between the assistant, the remote model and the tools.
//!
//! The OpenAI wire format is converted to and from these structs at the
//! provider boundary (`providers::utils`); everything above that boundary
//! works with the internal model only. Tool outputs stay `serde_json::Value`
//! end to end: whatever the search provider returned is what the model sees.
pub mod message;
pub mod role;
pub mod tool;
