//! Vocabulary-backed tokenizer with `SentencePiece`-like quirks

use promptline_inference::{InferenceError, TokenId, Tokenizer};

/// Beginning-of-sequence token added with special tokens
pub const BOS: TokenId = 1;
/// Lone word-boundary piece prepended to isolated encodings
pub const BOUNDARY: TokenId = 29871;

const SPECIAL_BASE: TokenId = 32_000;
const CHAR_BASE: TokenId = 100_000;

const V1_SPECIALS: &[&str] = &[
    "<|END_OF_SYSTEM|>",
    "<|END_OF_USER|>",
    "<|END_OF_ASSISTANT|>",
    "<|END_OF_FUNCTION_CALL|>",
    "<|END_OF_FUNCTION_RESULT|>",
];
const V2_SPECIALS: &[&str] = &["<|from|>", "<|recipient|>", "<|content|>", "<|stop|>"];

/// Encodes added special tokens as single ids and everything else per character
pub struct MockTokenizer {
    model_id: String,
    specials: Vec<&'static str>,
    boundary_quirk: bool,
}

impl MockTokenizer {
    /// Tokenizer carrying the v1 control tokens
    pub fn v1(model_id: &str) -> Self {
        Self::with_specials(model_id, V1_SPECIALS)
    }

    /// Tokenizer carrying the v2 control tokens
    pub fn v2(model_id: &str) -> Self {
        Self::with_specials(model_id, V2_SPECIALS)
    }

    /// Tokenizer with no added control tokens
    pub fn plain(model_id: &str) -> Self {
        Self::with_specials(model_id, &[])
    }

    fn with_specials(model_id: &str, specials: &[&'static str]) -> Self {
        Self {
            model_id: model_id.to_owned(),
            specials: specials.to_vec(),
            boundary_quirk: false,
        }
    }

    /// Prepend [`BOUNDARY`] to every non-empty encoding without special tokens
    pub fn with_boundary_quirk(mut self) -> Self {
        self.boundary_quirk = true;
        self
    }

    /// Ids for `text` with no special or boundary tokens added
    pub fn pieces(&self, text: &str) -> Vec<TokenId> {
        let mut ids = Vec::new();
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            let special = self
                .specials
                .iter()
                .enumerate()
                .filter(|(_, token)| rest.starts_with(**token))
                .max_by_key(|(_, token)| token.len());

            match special {
                Some((index, token)) => {
                    ids.push(SPECIAL_BASE + TokenId::try_from(index).unwrap());
                    rest = &rest[token.len()..];
                }
                None => {
                    ids.push(CHAR_BASE + u32::from(ch));
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        ids
    }
}

impl Tokenizer for MockTokenizer {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<TokenId>, InferenceError> {
        let mut ids = Vec::new();

        if add_special_tokens {
            ids.push(BOS);
        } else if self.boundary_quirk && !text.is_empty() {
            ids.push(BOUNDARY);
        }

        ids.extend(self.pieces(text));
        Ok(ids)
    }

    fn decode(&self, ids: &[TokenId], skip_special_tokens: bool) -> Result<String, InferenceError> {
        let mut text = String::new();

        for &id in ids {
            match id {
                BOS if !skip_special_tokens => text.push_str("<s>"),
                BOS => {}
                BOUNDARY => text.push(' '),
                id if id >= CHAR_BASE => {
                    let ch = char::from_u32(id - CHAR_BASE)
                        .ok_or_else(|| InferenceError::Tokenizer(format!("invalid character id {id}")))?;
                    text.push(ch);
                }
                id if id >= SPECIAL_BASE => {
                    let token = usize::try_from(id - SPECIAL_BASE)
                        .ok()
                        .and_then(|index| self.specials.get(index))
                        .ok_or_else(|| InferenceError::Tokenizer(format!("unknown token id {id}")))?;
                    if !skip_special_tokens {
                        text.push_str(token);
                    }
                }
                id => return Err(InferenceError::Tokenizer(format!("unknown token id {id}"))),
            }
        }

        Ok(text)
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.specials
            .iter()
            .position(|special| *special == token)
            .and_then(|index| TokenId::try_from(index).ok())
            .map(|index| SPECIAL_BASE + index)
    }
}
