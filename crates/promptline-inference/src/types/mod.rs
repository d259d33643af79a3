//! Canonical request and response types
//!
//! These mirror the `OpenAI` chat-completions shapes closely enough that
//! request files can be deserialized directly.

pub mod message;
pub mod request;
pub mod response;
pub mod tool;

pub use message::{FunctionCall, Message, Role, ToolCall};
pub use request::GenerationRequest;
pub use response::{FinishReason, GenerationOutcome, Usage};
pub use tool::{FunctionDefinition, ToolChoice, ToolChoiceFunction, ToolChoiceMode, ToolDefinition, ToolType};

/// Identifier of a single vocabulary entry
pub type TokenId = u32;
