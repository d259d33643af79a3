//! Tool-choice resolution
//!
//! Narrows the declared tool set according to the caller's policy and
//! decides whether the prompt must pre-commit the model to a recipient.

use crate::error::InferenceError;
use crate::types::{ToolChoice, ToolChoiceMode, ToolDefinition};

/// Recipient the assembled prompt pre-commits the model to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Forcing {
    /// The model picks its recipient freely
    #[default]
    Free,
    /// The model must answer the user without calling anything
    NoTool,
    /// The model must call this tool and only generates its arguments
    Tool(String),
}

impl Forcing {
    /// Name of the forced tool, if a tool is forced
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::Tool(name) => Some(name),
            Self::Free | Self::NoTool => None,
        }
    }
}

/// Effective tool set plus forcing decision
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTools {
    /// Tools exposed to the model
    pub tools: Vec<ToolDefinition>,
    /// Recipient forcing for the prompt tail
    pub forcing: Forcing,
}

/// Apply a tool-choice policy to the declared tool set
///
/// `"none"` empties the set, `"auto"` (or no policy) leaves it untouched, and
/// an explicit choice forces that tool. A bare reference selects the declared
/// tool with the same name; a full definition replaces the declared set.
///
/// # Errors
///
/// Returns `InferenceError::InvalidToolChoice` when a bare reference names a
/// tool that was not declared.
pub fn resolve_tool_choice(
    tools: Vec<ToolDefinition>,
    choice: Option<&ToolChoice>,
) -> Result<ResolvedTools, InferenceError> {
    let resolved = match choice {
        None | Some(ToolChoice::Mode(ToolChoiceMode::Auto)) => ResolvedTools {
            tools,
            forcing: Forcing::Free,
        },
        Some(ToolChoice::Mode(ToolChoiceMode::None)) => ResolvedTools {
            tools: Vec::new(),
            forcing: Forcing::NoTool,
        },
        Some(ToolChoice::Function(forced)) => {
            let name = forced.function.name.clone();

            let tools = if forced.function.is_bare_reference() {
                let matching: Vec<_> = tools
                    .into_iter()
                    .filter(|tool| tool.name() == Some(name.as_str()))
                    .collect();

                if matching.is_empty() {
                    return Err(InferenceError::InvalidToolChoice { name });
                }

                matching
            } else {
                vec![ToolDefinition::function(forced.function.clone())]
            };

            ResolvedTools {
                tools,
                forcing: Forcing::Tool(name),
            }
        }
    };

    tracing::debug!(
        tools = resolved.tools.len(),
        forcing = ?resolved.forcing,
        "tool choice resolved"
    );

    Ok(resolved)
}
