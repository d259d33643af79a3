//! Model collaborator and decode parameters

use promptline_config::ComputeTarget;

use crate::error::InferenceError;
use crate::types::TokenId;

/// Per-token stop check handed to the model
///
/// Receives every token generated so far (prompt excluded) and returns `true`
/// to halt decoding.
pub type StopPredicate<'a> = dyn FnMut(&[TokenId]) -> bool + 'a;

/// Parameters for a single decode run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature, always strictly positive
    pub temperature: f64,
    /// Hard ceiling on generated tokens
    pub max_new_tokens: u32,
    /// Where the model should run
    pub device: ComputeTarget,
}

/// Causal language model capable of token-by-token generation
pub trait Model: Send + Sync {
    /// Human-readable model name
    fn name(&self) -> &str;

    /// Generate a continuation of `prompt`
    ///
    /// Implementations call `stop` after each sampled token and halt as soon
    /// as it returns `true` or `max_new_tokens` tokens were produced. The
    /// returned sequence is the prompt followed by the generated tokens.
    fn generate(
        &self,
        prompt: &[TokenId],
        params: &GenerationParams,
        stop: &mut StopPredicate<'_>,
    ) -> Result<Vec<TokenId>, InferenceError>;
}
