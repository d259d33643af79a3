use serde::{Deserialize, Serialize};

/// Definition of a tool the model can call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Discriminator between callable functions and the code-interpreter sentinel
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    /// Function specification, absent for the code-interpreter sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDefinition>,
}

impl ToolDefinition {
    /// Wrap a function definition as a callable tool
    pub const fn function(function: FunctionDefinition) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: Some(function),
        }
    }

    /// The code-interpreter sentinel tool
    pub const fn code_interpreter() -> Self {
        Self {
            tool_type: ToolType::CodeInterpreter,
            function: None,
        }
    }

    /// Name of the wrapped function, if any
    pub fn name(&self) -> Option<&str> {
        self.function.as_ref().map(|f| f.name.as_str())
    }
}

/// Kind of tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Generic callable function
    Function,
    /// Placeholder replaced by the built-in python tool
    CodeInterpreter,
}

/// Specification of a callable function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the function parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl FunctionDefinition {
    /// A name-only definition
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: None,
        }
    }

    /// Whether this definition only names a function without redefining it
    pub fn is_bare_reference(&self) -> bool {
        self.description.as_deref().is_none_or(str::is_empty) && self.parameters.is_none()
    }
}

/// How the model should select tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    /// Simple mode: "none" or "auto"
    Mode(ToolChoiceMode),
    /// Force a specific function
    Function(ToolChoiceFunction),
}

impl ToolChoice {
    /// Force the previously declared function with this name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Function(ToolChoiceFunction {
            tool_type: ToolType::Function,
            function: FunctionDefinition::named(name),
        })
    }
}

/// Tool selection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoiceMode {
    /// Model will not call any tools
    None,
    /// Model decides whether to call tools
    Auto,
}

/// Force the model to call a specific function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolChoiceFunction {
    /// Must be "function"
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    /// Function to call, either a bare name or a full definition
    pub function: FunctionDefinition,
}
