//! Template lookup by model identity

use std::sync::Arc;

use promptline_config::{TemplateFamily, TemplateRule};
use regex::Regex;

use super::{DETECTION_ORDER, Template, builtin};
use crate::error::InferenceError;
use crate::stop::LeadingTokenCorrection;
use crate::tokenizer::Tokenizer;

/// Template selected for a request, with its tokenizer correction
#[derive(Clone)]
pub struct ResolvedTemplate {
    /// Chat grammar for the model
    pub template: Arc<dyn Template>,
    /// Boundary-token correction applied to stop markers
    pub correction: Option<LeadingTokenCorrection>,
}

impl std::fmt::Debug for ResolvedTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTemplate")
            .field("template", &self.template.name())
            .field("correction", &self.correction)
            .finish()
    }
}

#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    family: TemplateFamily,
    correction: Option<LeadingTokenCorrection>,
}

/// Maps tokenizers to templates
///
/// Configured rules are tried in order against the tokenizer's model id.
/// When none matches, each built-in family is probed by looking its
/// signature token up in the tokenizer's vocabulary.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    rules: Vec<CompiledRule>,
}

impl TemplateRegistry {
    /// Build a registry from configured rules
    ///
    /// # Errors
    ///
    /// Returns an error if a rule pattern is not a valid regex
    pub fn from_rules(rules: &[TemplateRule]) -> Result<Self, InferenceError> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<CompiledRule, InferenceError> {
                let pattern = Regex::new(&rule.pattern)
                    .map_err(|e| anyhow::anyhow!("invalid template pattern '{}': {e}", rule.pattern))?;

                Ok(CompiledRule {
                    pattern,
                    family: rule.family,
                    correction: rule.strip_leading_token.map(LeadingTokenCorrection::new),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Resolve the template for a tokenizer
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::TemplateResolution` when neither a rule nor
    /// vocabulary detection identifies the model family
    pub fn resolve(&self, tokenizer: &dyn Tokenizer) -> Result<ResolvedTemplate, InferenceError> {
        let model_id = tokenizer.model_id();

        if let Some(resolved) = self.match_rule(model_id) {
            return Ok(resolved);
        }

        let detected = DETECTION_ORDER
            .into_iter()
            .map(builtin)
            .find(|template| tokenizer.token_to_id(template.signature_token()).is_some());

        match detected {
            Some(template) => {
                tracing::debug!(model = model_id, template = template.name(), "template detected from vocabulary");
                Ok(ResolvedTemplate {
                    template,
                    correction: None,
                })
            }
            None => Err(InferenceError::TemplateResolution {
                model: model_id.to_owned(),
            }),
        }
    }

    /// Resolve the template for a model id using configured rules only
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::TemplateResolution` when no rule matches
    pub fn resolve_model_id(&self, model_id: &str) -> Result<ResolvedTemplate, InferenceError> {
        self.match_rule(model_id)
            .ok_or_else(|| InferenceError::TemplateResolution {
                model: model_id.to_owned(),
            })
    }

    fn match_rule(&self, model_id: &str) -> Option<ResolvedTemplate> {
        let rule = self.rules.iter().find(|rule| rule.pattern.is_match(model_id))?;

        let template = builtin(rule.family);
        tracing::debug!(
            model = model_id,
            template = template.name(),
            pattern = rule.pattern.as_str(),
            "template matched configured rule"
        );

        Some(ResolvedTemplate {
            template,
            correction: rule.correction,
        })
    }
}
