//! Prompt templates
//!
//! A template owns everything that is specific to one model family's chat
//! grammar: how turns are rendered, which markers end a turn, and how the
//! generated text is read back into structured fields.

mod registry;
mod schema;
mod v1;
mod v2;

use std::sync::Arc;

use promptline_config::TemplateFamily;

pub use registry::{ResolvedTemplate, TemplateRegistry};
pub use schema::{DEFAULT_SYSTEM_MESSAGE, render_namespace};
pub use v1::FunctionaryV1;
pub use v2::FunctionaryV2;

use crate::error::InferenceError;
use crate::types::{FunctionCall, FunctionDefinition, Message};

/// Point in an assistant turn where the model starts writing call arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStage {
    /// Right after the recipient name
    Function,
    /// After the arguments, where the next record begins
    Parameter,
}

/// Structured reading of one generated assistant turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantFields {
    /// Text addressed to the user
    pub content: Option<String>,
    /// Single legacy function call
    pub function_call: Option<FunctionCall>,
    /// Parallel tool calls, in generation order
    pub tool_calls: Vec<FunctionCall>,
}

/// Chat grammar for one model family
pub trait Template: Send + Sync {
    /// Family name used in logs
    fn name(&self) -> &'static str;

    /// Added vocabulary entry that identifies this family in a tokenizer
    fn signature_token(&self) -> &'static str;

    /// Rewrite the conversation into the shape `render` expects
    ///
    /// Injects the function schema and default system turns and converts
    /// call and result messages to the family's native form.
    fn normalize(&self, messages: Vec<Message>, functions: &[FunctionDefinition]) -> Vec<Message>;

    /// Render normalized messages to prompt text
    ///
    /// An assistant message without content or calls is the open generation
    /// slot and must be the last message.
    fn render(&self, messages: &[Message], functions: &[FunctionDefinition]) -> String;

    /// Markers that end an assistant turn
    fn stop_markers_for_generation(&self) -> &'static [&'static str];

    /// Marker emitted when the model enters the given stage of a call
    fn function_parameter_marker(&self, stage: ParameterStage) -> &'static str;

    /// Recipient text that pre-commits the open slot to `name`
    fn forced_recipient(&self, name: &str) -> String {
        name.to_owned()
    }

    /// Recipients that are not user-declared functions; the first one means
    /// "answer the user"
    fn predefined_function_names(&self) -> &'static [&'static str];

    /// Read generated text back into structured fields
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::MalformedResponse` when the text does not
    /// follow the family's grammar.
    fn parse_assistant_response(&self, text: &str) -> Result<AssistantFields, InferenceError>;
}

/// Built-in template for a configured family
pub fn builtin(family: TemplateFamily) -> Arc<dyn Template> {
    match family {
        TemplateFamily::V1 => Arc::new(FunctionaryV1),
        TemplateFamily::V2 => Arc::new(FunctionaryV2),
    }
}

/// Families probed, in order, when no configured rule matches
pub(crate) const DETECTION_ORDER: [TemplateFamily; 2] = [TemplateFamily::V2, TemplateFamily::V1];
