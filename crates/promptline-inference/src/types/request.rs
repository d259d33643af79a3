use serde::{Deserialize, Serialize};

use super::message::Message;
use super::tool::{FunctionDefinition, ToolChoice, ToolDefinition};

/// A single generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Conversation messages in causal order
    pub messages: Vec<Message>,
    /// Legacy function definitions, take precedence over `tools` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionDefinition>>,
    /// Tool definitions available to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// How the model should select tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature, configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate, configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    /// Extra stop markers, checked ahead of the template's own
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl GenerationRequest {
    /// Request over a conversation with no tools
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Declare the tools the model may call
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the tool-choice policy
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Tools the caller declared, legacy `functions` taking precedence
    pub fn declared_tools(&self) -> Vec<ToolDefinition> {
        match &self.functions {
            Some(functions) => functions.iter().cloned().map(ToolDefinition::function).collect(),
            None => self.tools.clone().unwrap_or_default(),
        }
    }
}
