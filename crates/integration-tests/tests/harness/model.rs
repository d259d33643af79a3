//! Scripted model that replays a fixed continuation

use std::sync::Mutex;

use promptline_inference::{GenerationParams, InferenceError, Model, StopPredicate, TokenId};

use super::tokenizer::MockTokenizer;

/// One observed `generate` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Prompt ids the model was conditioned on
    pub prompt: Vec<TokenId>,
    /// Decode parameters
    pub params: GenerationParams,
    /// Tokens produced before halting
    pub emitted: Vec<TokenId>,
}

/// Replays `script` token by token, honouring the stop predicate
pub struct ScriptedModel {
    script: Vec<TokenId>,
    echo_prompt: bool,
    ignore_ceiling: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    /// Model that will generate `text` as tokenized by `tokenizer`
    pub fn from_text(tokenizer: &MockTokenizer, text: &str) -> Self {
        Self::from_ids(tokenizer.pieces(text))
    }

    /// Model that will generate exactly `script`
    pub fn from_ids(script: Vec<TokenId>) -> Self {
        Self {
            script,
            echo_prompt: true,
            ignore_ceiling: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return only generated ids instead of prompt plus generated ids
    pub fn without_echo(mut self) -> Self {
        self.echo_prompt = false;
        self
    }

    /// Keep generating past `max_new_tokens`
    pub fn ignoring_ceiling(mut self) -> Self {
        self.ignore_ceiling = true;
        self
    }

    /// Calls observed so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The single call observed so far
    pub fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("model was called")
    }
}

impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(
        &self,
        prompt: &[TokenId],
        params: &GenerationParams,
        stop: &mut StopPredicate<'_>,
    ) -> Result<Vec<TokenId>, InferenceError> {
        let ceiling = if self.ignore_ceiling {
            usize::MAX
        } else {
            params.max_new_tokens as usize
        };

        let mut emitted = Vec::new();
        for &id in self.script.iter().take(ceiling) {
            emitted.push(id);
            if stop(&emitted) {
                break;
            }
        }

        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_vec(),
            params: params.clone(),
            emitted: emitted.clone(),
        });

        let mut output = if self.echo_prompt { prompt.to_vec() } else { Vec::new() };
        output.extend(emitted);
        Ok(output)
    }
}
