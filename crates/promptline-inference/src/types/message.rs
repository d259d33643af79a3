use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Legacy function result
    Function,
    /// Tool result
    Tool,
}

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Text content
    #[serde(default)]
    pub content: Option<String>,
    /// Name of the function or tool that produced a result message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Legacy single function call made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// ID of the tool call this message is a response to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            name: None,
            function_call: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Create a plain-text assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// Create an empty assistant message, the slot generation fills
    pub fn open_assistant() -> Self {
        Self::with_role(Role::Assistant, None)
    }

    /// Create a legacy function result message
    pub fn function_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::with_role(Role::Function, Some(content.into()))
        }
    }

    /// Create a tool result message
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, Some(content.into()))
        }
    }

    /// Whether the message carries any call, legacy or tool-style
    pub fn has_calls(&self) -> bool {
        self.function_call.is_some() || self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// A tool call requested by the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Call type (always "function")
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    /// Name and arguments of the call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Build a tool call with a freshly generated identifier
    pub fn new(function: FunctionCall) -> Self {
        Self {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            call_type: default_call_type(),
            function,
        }
    }
}

fn default_call_type() -> String {
    "function".to_owned()
}

/// Function name and arguments within a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// Serialized arguments, opaque to this layer
    pub arguments: String,
}

impl FunctionCall {
    /// Create a function call from its parts
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}
