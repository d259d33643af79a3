use serde::{Deserialize, Serialize};

use super::message::Message;

/// Reason the decode loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// A stop sequence matched the generated tail
    Stop,
    /// Hit the `max_new_tokens` ceiling
    Length,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the assembled prompt
    pub prompt_tokens: usize,
    /// Tokens produced by the model, before stop trimming
    pub completion_tokens: usize,
}

/// Structured assistant turn together with decode metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Parsed assistant message
    pub message: Message,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Token usage statistics
    pub usage: Usage,
}
