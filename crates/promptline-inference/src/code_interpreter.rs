//! Code-interpreter substitution
//!
//! Replaces the `{"type": "code_interpreter"}` sentinel with the built-in
//! `python` tool the models were trained to call.

use serde_json::json;

use crate::types::{FunctionDefinition, ToolDefinition, ToolType};

/// Name of the built-in code execution tool
pub const PYTHON_TOOL_NAME: &str = "python";

const PYTHON_TOOL_DESCRIPTION: &str = "When you send a message containing Python code to python, it will be \
executed in a stateful Jupyter notebook environment. python will respond with the output of the execution or \
time out after 60.0 seconds. The drive at '/mnt/data' can be used to save and persist user files. Internet \
access for this session is disabled. Do not make external web requests or API calls as they will fail.";

/// The built-in `python` tool declaration
pub fn python_tool() -> ToolDefinition {
    ToolDefinition::function(FunctionDefinition {
        name: PYTHON_TOOL_NAME.to_owned(),
        description: Some(PYTHON_TOOL_DESCRIPTION.to_owned()),
        parameters: Some(json!({
            "type": "object",
            "properties": {},
        })),
    })
}

/// Replace the first code-interpreter sentinel with the `python` tool
///
/// Later sentinels are left as they are; a set without one is returned unchanged.
pub fn substitute_code_interpreter(mut tools: Vec<ToolDefinition>) -> Vec<ToolDefinition> {
    if let Some(slot) = tools
        .iter_mut()
        .find(|tool| tool.tool_type == ToolType::CodeInterpreter)
    {
        *slot = python_tool();
        tracing::debug!("code interpreter replaced with built-in python tool");
    }

    tools
}
