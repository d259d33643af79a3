use super::{AssistantFields, ParameterStage, Template, schema};
use crate::error::InferenceError;
use crate::types::{FunctionCall, FunctionDefinition, Message, Role};

const END_SYSTEM: &str = "<|END_OF_SYSTEM|>";
const END_USER: &str = "<|END_OF_USER|>";
const END_ASSISTANT: &str = "<|END_OF_ASSISTANT|>";
const END_FUNCTION_CALL: &str = "<|END_OF_FUNCTION_CALL|>";
const END_FUNCTION_RESULT: &str = "<|END_OF_FUNCTION_RESULT|>";

const CALL_PREFIX: &str = "to=functions.";

/// Role-headed grammar with one `<|END_OF_*|>` marker per turn kind
///
/// ```text
/// user:
/// What's the weather?<|END_OF_USER|>
/// assistant to=functions.get_weather:
/// {"city": "Paris"}<|END_OF_FUNCTION_CALL|>
/// ```
///
/// Supports a single function call per assistant turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionaryV1;

impl Template for FunctionaryV1 {
    fn name(&self) -> &'static str {
        "functionary-v1"
    }

    fn signature_token(&self) -> &'static str {
        END_ASSISTANT
    }

    fn normalize(&self, messages: Vec<Message>, functions: &[FunctionDefinition]) -> Vec<Message> {
        let mut normalized = Vec::with_capacity(messages.len() + 2);
        normalized.extend(schema::system_messages(functions));

        for mut message in messages {
            if message.role == Role::Tool {
                message.role = Role::Function;
                message.tool_call_id = None;
            }

            if let Some(calls) = message.tool_calls.take() {
                if calls.len() > 1 {
                    tracing::warn!(calls = calls.len(), "template supports one call per turn, keeping the first");
                }

                if message.function_call.is_none() {
                    message.function_call = calls.into_iter().next().map(|call| call.function);
                }
            }

            normalized.push(message);
        }

        normalized
    }

    fn render(&self, messages: &[Message], _functions: &[FunctionDefinition]) -> String {
        let mut out = String::new();

        for (index, message) in messages.iter().enumerate() {
            let content = message.content.as_deref().unwrap_or_default();
            let last = index + 1 == messages.len();

            match message.role {
                Role::System => {
                    out.push_str(&format!("system:\n{content}{END_SYSTEM}\n"));
                }
                Role::User => {
                    out.push_str(&format!("user:\n{content}{END_USER}\n"));
                }
                Role::Function | Role::Tool => {
                    let name = message.name.as_deref().unwrap_or_default();
                    out.push_str(&format!("function name={name}:\n{content}{END_FUNCTION_RESULT}\n"));
                }
                Role::Assistant => match &message.function_call {
                    None if last && content.is_empty() => out.push_str("assistant"),
                    None => out.push_str(&format!("assistant:\n{content}{END_ASSISTANT}\n")),
                    Some(call) => {
                        if !content.is_empty() {
                            out.push_str(&format!("assistant:\n{content}{END_ASSISTANT}\n"));
                        }
                        out.push_str(&format!(
                            "assistant {CALL_PREFIX}{}:\n{}{END_FUNCTION_CALL}\n",
                            call.name, call.arguments
                        ));
                    }
                },
            }
        }

        out
    }

    fn stop_markers_for_generation(&self) -> &'static [&'static str] {
        &[END_ASSISTANT, END_FUNCTION_CALL]
    }

    fn function_parameter_marker(&self, stage: ParameterStage) -> &'static str {
        match stage {
            ParameterStage::Function => ":\n",
            ParameterStage::Parameter => END_FUNCTION_CALL,
        }
    }

    fn forced_recipient(&self, name: &str) -> String {
        format!(" {CALL_PREFIX}{name}")
    }

    fn predefined_function_names(&self) -> &'static [&'static str] {
        &[""]
    }

    fn parse_assistant_response(&self, text: &str) -> Result<AssistantFields, InferenceError> {
        let mut text = text.trim();
        for marker in [END_ASSISTANT, END_FUNCTION_CALL] {
            text = text.strip_suffix(marker).unwrap_or(text);
        }

        if let Some(call) = text.strip_prefix(CALL_PREFIX) {
            let (name, arguments) = call.split_once(':').ok_or_else(|| {
                InferenceError::MalformedResponse(format!("function call without arguments: {text:?}"))
            })?;

            let name = name.trim();
            if name.is_empty() {
                return Err(InferenceError::MalformedResponse(format!("function call without a name: {text:?}")));
            }

            return Ok(AssistantFields {
                function_call: Some(FunctionCall::new(name, arguments.trim())),
                ..AssistantFields::default()
            });
        }

        let content = text
            .strip_prefix(':')
            .ok_or_else(|| InferenceError::MalformedResponse(format!("unexpected assistant header: {text:?}")))?;

        Ok(AssistantFields {
            content: Some(content.trim().to_owned()),
            ..AssistantFields::default()
        })
    }
}
