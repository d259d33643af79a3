//! Prompt assembly
//!
//! Turns a conversation and its effective tool set into the token ids the
//! model is conditioned on, including the forced recipient tail.

use crate::error::InferenceError;
use crate::template::{ParameterStage, Template};
use crate::tokenizer::Tokenizer;
use crate::tool_choice::Forcing;
use crate::types::{FunctionDefinition, Message, TokenId, ToolDefinition};

/// Prompt ready for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Rendered prompt text, forced tail included
    pub text: String,
    /// Tokenized prompt with the tokenizer's special tokens
    pub token_ids: Vec<TokenId>,
    /// Forced tail appended after the open assistant slot
    ///
    /// Generated text continues this tail, so it is prepended again before
    /// the response is parsed.
    pub forced_prefix: String,
}

/// Renders and tokenizes prompts for one template and tokenizer pair
#[derive(Clone, Copy)]
pub struct PromptAssembler<'a> {
    template: &'a dyn Template,
    tokenizer: &'a dyn Tokenizer,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(template: &'a dyn Template, tokenizer: &'a dyn Tokenizer) -> Self {
        Self { template, tokenizer }
    }

    /// Render and tokenize the prompt
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Tokenizer` if the prompt cannot be encoded
    pub fn assemble(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        forcing: &Forcing,
    ) -> Result<AssembledPrompt, InferenceError> {
        let (text, forced_prefix) = render(self.template, messages, tools, forcing);
        let token_ids = self.tokenizer.encode(&text, true)?;

        tracing::debug!(
            template = self.template.name(),
            prompt_tokens = token_ids.len(),
            forced = !forced_prefix.is_empty(),
            "prompt assembled"
        );

        Ok(AssembledPrompt {
            text,
            token_ids,
            forced_prefix,
        })
    }
}

/// Render prompt text without tokenizing it
pub fn render_text(
    template: &dyn Template,
    messages: &[Message],
    tools: &[ToolDefinition],
    forcing: &Forcing,
) -> String {
    render(template, messages, tools, forcing).0
}

/// Function definitions carried by the tool set
///
/// Tools without a function definition, such as an unsubstituted code
/// interpreter, are not shown to the model.
pub fn function_definitions(tools: &[ToolDefinition]) -> Vec<FunctionDefinition> {
    tools.iter().filter_map(|tool| tool.function.clone()).collect()
}

/// Forced tail for the open assistant slot
pub fn forced_tail(template: &dyn Template, forcing: &Forcing) -> String {
    let recipient = match forcing {
        Forcing::Free => return String::new(),
        Forcing::Tool(name) => template.forced_recipient(name),
        Forcing::NoTool => match template.predefined_function_names().first() {
            Some(name) => (*name).to_owned(),
            None => {
                tracing::warn!(template = template.name(), "template has no predefined recipient, not forcing");
                return String::new();
            }
        },
    };

    recipient + template.function_parameter_marker(ParameterStage::Function)
}

fn render(
    template: &dyn Template,
    messages: &[Message],
    tools: &[ToolDefinition],
    forcing: &Forcing,
) -> (String, String) {
    let functions = function_definitions(tools);

    let mut records = messages.to_vec();
    records.push(Message::open_assistant());

    let records = template.normalize(records, &functions);
    let mut text = template.render(&records, &functions);

    let forced_prefix = forced_tail(template, forcing);
    text.push_str(&forced_prefix);

    (text, forced_prefix)
}
