//! Generation controller
//!
//! Runs one request end to end: tool resolution, prompt assembly, the decode
//! loop with its per-token stop check, trimming, decoding, and parsing.

use std::sync::Arc;

use promptline_config::InferenceConfig;

use crate::code_interpreter::substitute_code_interpreter;
use crate::error::InferenceError;
use crate::model::{GenerationParams, Model};
use crate::prompt::{AssembledPrompt, PromptAssembler};
use crate::response::parse_response;
use crate::stop::StopSequences;
use crate::template::{ResolvedTemplate, TemplateRegistry};
use crate::tokenizer::Tokenizer;
use crate::tool_choice::{ResolvedTools, resolve_tool_choice};
use crate::types::{FinishReason, GenerationOutcome, GenerationRequest, Message, TokenId, Usage};

/// Temperature actually used for sampling
///
/// Exactly zero is replaced by `min_temperature` so samplers never divide by
/// zero; every other value passes through.
#[allow(clippy::float_cmp)]
pub fn effective_temperature(requested: f64, min_temperature: f64) -> f64 {
    if requested == 0.0 { min_temperature } else { requested }
}

/// Everything a request needs before decoding starts
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Template chosen for the tokenizer
    pub template: ResolvedTemplate,
    /// Tool set and forcing after substitution and tool-choice resolution
    pub tools: ResolvedTools,
    /// Rendered and tokenized prompt
    pub prompt: AssembledPrompt,
    /// Tokenized stop markers
    pub stops: StopSequences,
    /// Decode parameters
    pub params: GenerationParams,
}

/// Drives a model through one function-calling turn
pub struct InferenceEngine {
    model: Arc<dyn Model>,
    tokenizer: Arc<dyn Tokenizer>,
    registry: Arc<TemplateRegistry>,
    config: InferenceConfig,
}

impl InferenceEngine {
    pub fn new(
        model: Arc<dyn Model>,
        tokenizer: Arc<dyn Tokenizer>,
        registry: Arc<TemplateRegistry>,
        config: InferenceConfig,
    ) -> Self {
        Self {
            model,
            tokenizer,
            registry,
            config,
        }
    }

    /// Decode defaults in effect
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Resolve tools and template, then assemble the prompt and stop set
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if `max_new_tokens` is zero,
    /// `TemplateResolution` if the tokenizer's family is unknown,
    /// `InvalidToolChoice` if a forced tool was never declared, or a
    /// tokenizer error while encoding the prompt or stop markers
    pub fn prepare(&self, request: &GenerationRequest) -> Result<PreparedRequest, InferenceError> {
        let max_new_tokens = request.max_new_tokens.unwrap_or(self.config.max_new_tokens);
        if max_new_tokens == 0 {
            return Err(InferenceError::InvalidRequest(
                "max_new_tokens must be greater than 0".to_owned(),
            ));
        }

        let template = self.registry.resolve(self.tokenizer.as_ref())?;

        let tools = resolve_tool_choice(
            substitute_code_interpreter(request.declared_tools()),
            request.tool_choice.as_ref(),
        )?;

        let prompt = PromptAssembler::new(template.template.as_ref(), self.tokenizer.as_ref()).assemble(
            &request.messages,
            &tools.tools,
            &tools.forcing,
        )?;

        let markers: Vec<&str> = self
            .config
            .stop
            .iter()
            .chain(&request.stop)
            .map(String::as_str)
            .chain(template.template.stop_markers_for_generation().iter().copied())
            .collect();
        let stops = StopSequences::from_markers(&markers, self.tokenizer.as_ref(), template.correction)?;

        let params = GenerationParams {
            temperature: effective_temperature(
                request.temperature.unwrap_or(self.config.temperature),
                self.config.min_temperature,
            ),
            max_new_tokens,
            device: self.config.device,
        };

        Ok(PreparedRequest {
            template,
            tools,
            prompt,
            stops,
            params,
        })
    }

    /// Generate the assistant turn for a request
    ///
    /// # Errors
    ///
    /// Any error from `prepare`, the model, the tokenizer, or
    /// `MalformedResponse` when the output cannot be parsed
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome, InferenceError> {
        let prepared = self.prepare(request)?;
        let PreparedRequest {
            template,
            prompt,
            stops,
            params,
            ..
        } = &prepared;

        let mut halt = |generated: &[TokenId]| stops.matches(generated);
        let output = self.model.generate(&prompt.token_ids, params, &mut halt)?;

        let generated = output.strip_prefix(prompt.token_ids.as_slice()).ok_or_else(|| {
            InferenceError::Model(format!(
                "model {} returned output that does not start with the prompt",
                self.model.name()
            ))
        })?;

        let ceiling = usize::try_from(params.max_new_tokens).unwrap_or(usize::MAX);
        let generated = &generated[..generated.len().min(ceiling)];

        let stopped = stops.matches(generated);
        let trimmed = stops.trim(generated);

        let decoded = self.tokenizer.decode(trimmed, false)?;
        let text = format!("{}{}", prompt.forced_prefix, decoded.trim());

        let finish_reason = if stopped || generated.len() < ceiling {
            FinishReason::Stop
        } else {
            FinishReason::Length
        };

        let message = parse_response(template.template.as_ref(), &text)?;

        let usage = Usage {
            prompt_tokens: prompt.token_ids.len(),
            completion_tokens: generated.len(),
        };

        tracing::info!(
            model = self.model.name(),
            template = template.template.name(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            temperature = params.temperature,
            finish_reason = ?finish_reason,
            "generation completed"
        );

        Ok(GenerationOutcome {
            message,
            finish_reason,
            usage,
        })
    }

    /// Generate and return only the assistant message
    ///
    /// # Errors
    ///
    /// Same as [`InferenceEngine::generate`]
    pub fn generate_message(&self, request: &GenerationRequest) -> Result<Message, InferenceError> {
        self.generate(request).map(|outcome| outcome.message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use promptline_config::{TemplateFamily, TemplateRule};

    use super::*;
    use crate::model::StopPredicate;
    use crate::types::{FunctionDefinition, ToolChoice, ToolDefinition};

    struct ByteTokenizer;

    impl Tokenizer for ByteTokenizer {
        fn model_id(&self) -> &str {
            "test/functionary-v2"
        }

        fn encode(&self, text: &str, _add_special_tokens: bool) -> Result<Vec<TokenId>, InferenceError> {
            Ok(text.bytes().map(TokenId::from).collect())
        }

        fn decode(&self, ids: &[TokenId], _skip_special_tokens: bool) -> Result<String, InferenceError> {
            let bytes: Vec<u8> = ids.iter().filter_map(|&id| u8::try_from(id).ok()).collect();
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }

        fn token_to_id(&self, _token: &str) -> Option<TokenId> {
            None
        }
    }

    struct ScriptedModel {
        script: Vec<TokenId>,
        seen: Mutex<Option<GenerationParams>>,
    }

    impl ScriptedModel {
        fn new(script: &str) -> Self {
            Self {
                script: script.bytes().map(TokenId::from).collect(),
                seen: Mutex::new(None),
            }
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
            *self.seen.lock().unwrap() = Some(params.clone());

            let mut output = prompt.to_vec();
            for &id in self.script.iter().take(params.max_new_tokens as usize) {
                output.push(id);
                if stop(&output[prompt.len()..]) {
                    break;
                }
            }

            Ok(output)
        }
    }

    fn engine(model: Arc<ScriptedModel>) -> InferenceEngine {
        let registry = TemplateRegistry::from_rules(&[TemplateRule {
            pattern: "functionary-v2".to_owned(),
            family: TemplateFamily::V2,
            strip_leading_token: None,
        }])
        .unwrap();

        InferenceEngine::new(model, Arc::new(ByteTokenizer), Arc::new(registry), InferenceConfig::default())
    }

    #[test]
    fn zero_temperature_is_remapped() {
        assert!((effective_temperature(0.0, 0.001) - 0.001).abs() < f64::EPSILON);
        assert!((effective_temperature(0.5, 0.001) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn halts_at_stop_marker_and_trims_it() {
        let model = Arc::new(ScriptedModel::new("all\n<|content|>Hello!<|stop|>ignored"));
        let engine = engine(Arc::clone(&model));

        let mut request = GenerationRequest::new(vec![Message::user("Hi")]);
        request.temperature = Some(0.0);

        let outcome = engine.generate(&request).unwrap();

        assert_eq!(outcome.message.content.as_deref(), Some("Hello!"));
        assert_eq!(outcome.finish_reason, FinishReason::Stop);
        assert_eq!(
            outcome.usage.completion_tokens,
            "all\n<|content|>Hello!<|stop|>".len()
        );

        let seen = model.seen.lock().unwrap().clone().unwrap();
        assert!((seen.temperature - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn max_new_tokens_bounds_generation() {
        let model = Arc::new(ScriptedModel::new("all\n<|content|>a long answer that never stops"));
        let engine = engine(model);

        let mut request = GenerationRequest::new(vec![Message::user("Hi")]);
        request.max_new_tokens = Some(18);

        let outcome = engine.generate(&request).unwrap();

        assert_eq!(outcome.finish_reason, FinishReason::Length);
        assert_eq!(outcome.usage.completion_tokens, 18);
        assert_eq!(outcome.message.content.as_deref(), Some("a l"));
    }

    #[test]
    fn zero_max_new_tokens_is_rejected() {
        let model = Arc::new(ScriptedModel::new("all\n<|content|>Hello!<|stop|>"));
        let engine = engine(Arc::clone(&model));

        let mut request = GenerationRequest::new(vec![Message::user("Hi")]);
        request.max_new_tokens = Some(0);

        let err = engine.generate(&request).unwrap_err();

        assert!(matches!(err, InferenceError::InvalidRequest(_)));
        assert!(err.is_usage_error());
        assert!(model.seen.lock().unwrap().is_none());
    }

    #[test]
    fn forced_tool_output_is_parsed_as_call() {
        let model = Arc::new(ScriptedModel::new("{\"city\": \"Paris\"}<|stop|>"));
        let engine = engine(model);

        let request = GenerationRequest::new(vec![Message::user("Weather in Paris?")])
            .with_tools(vec![ToolDefinition::function(FunctionDefinition {
                name: "get_weather".to_owned(),
                description: Some("Current weather".to_owned()),
                parameters: None,
            })])
            .with_tool_choice(ToolChoice::named("get_weather"));

        let message = engine.generate_message(&request).unwrap();
        let calls = message.tool_calls.unwrap();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_weather");
        assert_eq!(calls[0].function.arguments, "{\"city\": \"Paris\"}");
    }
}
