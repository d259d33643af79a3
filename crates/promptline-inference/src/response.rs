//! Assistant message reconstruction from generated text

use crate::error::InferenceError;
use crate::template::Template;
use crate::types::{Message, ToolCall};

/// Parse generated text into an assistant message
///
/// # Errors
///
/// Propagates `InferenceError::MalformedResponse` from the template unchanged.
pub fn parse_response(template: &dyn Template, text: &str) -> Result<Message, InferenceError> {
    let fields = template.parse_assistant_response(text)?;

    let tool_calls = (!fields.tool_calls.is_empty())
        .then(|| fields.tool_calls.into_iter().map(ToolCall::new).collect::<Vec<_>>());

    let mut message = Message::open_assistant();
    message.content = fields.content;
    message.function_call = fields.function_call;
    message.tool_calls = tool_calls;

    tracing::debug!(
        template = template.name(),
        has_content = message.content.is_some(),
        calls = message.tool_calls.as_ref().map_or(0, Vec::len) + usize::from(message.function_call.is_some()),
        "assistant response parsed"
    );

    Ok(message)
}
