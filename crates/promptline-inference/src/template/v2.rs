use super::{AssistantFields, ParameterStage, Template, schema};
use crate::error::InferenceError;
use crate::types::{FunctionCall, FunctionDefinition, Message, Role, ToolCall};

const FROM: &str = "<|from|>";
const RECIPIENT: &str = "<|recipient|>";
const CONTENT: &str = "<|content|>";
const STOP: &str = "<|stop|>";

/// Recipient of text addressed to the user
const ALL: &str = "all";

/// Record-based grammar with explicit sender and recipient headers
///
/// ```text
/// <|from|>user
/// <|recipient|>all
/// <|content|>What's the weather?
/// <|from|>assistant
/// <|recipient|>get_weather
/// <|content|>{"city": "Paris"}<|stop|>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionaryV2;

impl FunctionaryV2 {
    fn render_record(out: &mut String, from: &str, recipient: &str, content: &str) {
        out.push_str(FROM);
        out.push_str(from);
        out.push('\n');
        out.push_str(RECIPIENT);
        out.push_str(recipient);
        out.push('\n');
        out.push_str(CONTENT);
        out.push_str(content);
    }

    fn render_assistant(out: &mut String, message: &Message) {
        let mut parts = Vec::new();

        if let Some(content) = message.content.as_deref().filter(|c| !c.is_empty()) {
            let mut part = String::new();
            Self::render_record(&mut part, "assistant", ALL, content);
            parts.push(part);
        }

        for call in message.tool_calls.iter().flatten() {
            let mut part = String::new();
            Self::render_record(&mut part, "assistant", &call.function.name, &call.function.arguments);
            parts.push(part);
        }

        if parts.is_empty() {
            let mut part = String::new();
            Self::render_record(&mut part, "assistant", ALL, "");
            parts.push(part);
        }

        out.push_str(&parts.join("\n"));
        out.push_str(STOP);
        out.push('\n');
    }
}

impl Template for FunctionaryV2 {
    fn name(&self) -> &'static str {
        "functionary-v2"
    }

    fn signature_token(&self) -> &'static str {
        FROM
    }

    fn normalize(&self, messages: Vec<Message>, functions: &[FunctionDefinition]) -> Vec<Message> {
        let mut normalized = Vec::with_capacity(messages.len() + 2);
        normalized.extend(schema::system_messages(functions));

        for mut message in messages {
            if message.role == Role::Function {
                message.role = Role::Tool;
            }

            if let Some(call) = message.function_call.take() {
                message.tool_calls.get_or_insert_with(Vec::new).push(ToolCall::new(call));
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
                Role::Assistant if last && !message.has_calls() && content.is_empty() => {
                    out.push_str(FROM);
                    out.push_str("assistant\n");
                    out.push_str(RECIPIENT);
                }
                Role::Assistant => Self::render_assistant(&mut out, message),
                Role::Tool | Role::Function => {
                    let from = message.name.as_deref().unwrap_or(message.role.as_ref());
                    Self::render_record(&mut out, from, ALL, content);
                    out.push('\n');
                }
                Role::System | Role::User => {
                    Self::render_record(&mut out, message.role.as_ref(), ALL, content);
                    out.push('\n');
                }
            }
        }

        out
    }

    fn stop_markers_for_generation(&self) -> &'static [&'static str] {
        &[STOP]
    }

    fn function_parameter_marker(&self, stage: ParameterStage) -> &'static str {
        match stage {
            ParameterStage::Function => "\n<|content|>",
            ParameterStage::Parameter => "\n<|from|>",
        }
    }

    fn predefined_function_names(&self) -> &'static [&'static str] {
        &[ALL]
    }

    fn parse_assistant_response(&self, text: &str) -> Result<AssistantFields, InferenceError> {
        let text = text.trim();
        let text = text.strip_suffix(STOP).unwrap_or(text).trim_end();
        let text = text.strip_prefix(RECIPIENT).unwrap_or(text);

        let mut fields = AssistantFields::default();
        let separator = format!("\n{FROM}assistant\n{RECIPIENT}");

        for chunk in text.split(separator.as_str()) {
            let (recipient, body) = chunk.split_once(&format!("\n{CONTENT}")).ok_or_else(|| {
                InferenceError::MalformedResponse(format!("missing {CONTENT} after recipient in {chunk:?}"))
            })?;

            let recipient = recipient.trim();
            let body = body.strip_suffix(STOP).unwrap_or(body).trim();

            if recipient.is_empty() {
                return Err(InferenceError::MalformedResponse(format!("empty recipient in {chunk:?}")));
            }

            if recipient == ALL {
                match fields.content.as_mut() {
                    Some(content) => {
                        content.push('\n');
                        content.push_str(body);
                    }
                    None => fields.content = Some(body.to_owned()),
                }
            } else {
                fields.tool_calls.push(FunctionCall::new(recipient, body));
            }
        }

        Ok(fields)
    }
}
