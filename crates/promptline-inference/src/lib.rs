//! Function-calling inference control for promptline
//!
//! Sits between a chat request and a local causal language model: resolves
//! which tools the model may call, renders the family-specific prompt,
//! stops decoding on token-level markers, and parses the generated turn back
//! into an assistant message.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod code_interpreter;
pub mod error;
pub mod generation;
pub mod model;
pub mod prompt;
pub mod response;
pub mod stop;
pub mod template;
pub mod tokenizer;
pub mod tool_choice;
pub mod types;

pub use error::InferenceError;
pub use generation::{InferenceEngine, PreparedRequest, effective_temperature};
pub use model::{GenerationParams, Model, StopPredicate};
pub use prompt::{AssembledPrompt, PromptAssembler, render_text};
pub use response::parse_response;
pub use stop::{LeadingTokenCorrection, StopSequences, trim_stop_sequence};
pub use template::{ResolvedTemplate, Template, TemplateRegistry};
pub use tokenizer::Tokenizer;
pub use tool_choice::{Forcing, ResolvedTools, resolve_tool_choice};
pub use types::{GenerationOutcome, GenerationRequest, Message, TokenId};
