//! Stop-sequence matching and post-generation trimming
//!
//! Stop markers are compared as token-id sequences, never as decoded text, so
//! tokenizer merges cannot hide or fake a match.

use crate::error::InferenceError;
use crate::tokenizer::Tokenizer;
use crate::types::TokenId;

/// Drops a spurious boundary token some tokenizers put in front of markers
///
/// `SentencePiece` Llama tokenizers encode a lone `▁` (id 29871) before
/// certain strings when they are tokenized in isolation. The leading id is
/// only removed when the marker encodes to more than one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadingTokenCorrection {
    token_id: TokenId,
}

impl LeadingTokenCorrection {
    /// Correction for the given boundary token
    pub const fn new(token_id: TokenId) -> Self {
        Self { token_id }
    }

    /// The token id this correction strips
    pub const fn token_id(&self) -> TokenId {
        self.token_id
    }

    /// Strip the boundary token from a tokenized marker
    pub fn apply(&self, ids: &mut Vec<TokenId>) {
        if ids.len() > 1 && ids[0] == self.token_id {
            ids.remove(0);
        }
    }
}

/// Set of token-id sequences that halt generation
///
/// Sequences are kept sorted longest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSequences {
    sequences: Vec<Vec<TokenId>>,
}

impl StopSequences {
    /// Build from already tokenized sequences, dropping empty ones
    pub fn new(sequences: Vec<Vec<TokenId>>) -> Self {
        let mut sequences: Vec<_> = sequences.into_iter().filter(|seq| !seq.is_empty()).collect();
        sequences.sort_by_key(|seq| std::cmp::Reverse(seq.len()));
        Self { sequences }
    }

    /// Tokenize stop markers without special tokens
    ///
    /// Markers that encode to nothing are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Tokenizer` if a marker cannot be encoded.
    pub fn from_markers<S: AsRef<str>>(
        markers: &[S],
        tokenizer: &dyn Tokenizer,
        correction: Option<LeadingTokenCorrection>,
    ) -> Result<Self, InferenceError> {
        let mut sequences = Vec::with_capacity(markers.len());

        for marker in markers {
            let marker = marker.as_ref();
            let mut ids = tokenizer.encode(marker, false)?;

            if let Some(correction) = correction {
                correction.apply(&mut ids);
            }

            if ids.is_empty() {
                tracing::warn!(marker, "stop marker encodes to no tokens, ignoring");
                continue;
            }

            tracing::trace!(marker, ?ids, "stop marker tokenized");
            sequences.push(ids);
        }

        Ok(Self::new(sequences))
    }

    /// Whether the generated tail equals any stop sequence
    pub fn matches(&self, generated: &[TokenId]) -> bool {
        self.sequences.iter().any(|seq| generated.ends_with(seq))
    }

    /// Longest stop sequence the generated tail ends with
    pub fn matching(&self, generated: &[TokenId]) -> Option<&[TokenId]> {
        self.sequences
            .iter()
            .find(|seq| generated.ends_with(seq))
            .map(Vec::as_slice)
    }

    /// Remove the longest trailing stop sequence, if any
    pub fn trim<'a>(&self, generated: &'a [TokenId]) -> &'a [TokenId] {
        match self.matching(generated) {
            Some(seq) => &generated[..generated.len() - seq.len()],
            None => generated,
        }
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether no sequences are registered
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Iterate sequences, longest first
    pub fn iter(&self) -> impl Iterator<Item = &[TokenId]> {
        self.sequences.iter().map(Vec::as_slice)
    }
}

/// Remove the longest of `stops` that `ids` ends with
///
/// Returns `ids` unchanged when no stop sequence matches its tail.
pub fn trim_stop_sequence<'a>(ids: &'a [TokenId], stops: &[Vec<TokenId>]) -> &'a [TokenId] {
    let mut sorted: Vec<&Vec<TokenId>> = stops.iter().filter(|seq| !seq.is_empty()).collect();
    sorted.sort_by_key(|seq| std::cmp::Reverse(seq.len()));

    sorted
        .into_iter()
        .find(|seq| ids.ends_with(seq))
        .map_or(ids, |seq| &ids[..ids.len() - seq.len()])
}
