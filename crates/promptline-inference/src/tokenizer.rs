//! Tokenizer collaborator

use crate::error::InferenceError;
use crate::types::TokenId;

/// Text to token-id conversion for one model family
pub trait Tokenizer: Send + Sync {
    /// Identity of the model this tokenizer belongs to, used for template lookup
    fn model_id(&self) -> &str;

    /// Encode text, optionally adding the tokenizer's special tokens (e.g. BOS)
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<TokenId>, InferenceError>;

    /// Decode token ids back to text
    fn decode(&self, ids: &[TokenId], skip_special_tokens: bool) -> Result<String, InferenceError>;

    /// Look up a single vocabulary entry, typically an added special token
    fn token_to_id(&self, token: &str) -> Option<TokenId>;
}
