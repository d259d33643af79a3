//! Shared fixtures for end-to-end inference tests

#![allow(dead_code)]

pub mod config;
pub mod model;
pub mod tokenizer;

use std::sync::Arc;

use promptline_config::Config;
use promptline_inference::{InferenceEngine, Model, TemplateRegistry};

use self::model::ScriptedModel;
use self::tokenizer::MockTokenizer;

/// Build an engine over the mock collaborators
pub fn engine(
    config: &Config,
    tokenizer: MockTokenizer,
    model: &Arc<ScriptedModel>,
) -> anyhow::Result<InferenceEngine> {
    let registry = TemplateRegistry::from_rules(&config.templates)?;
    let model: Arc<dyn Model> = Arc::<ScriptedModel>::clone(model);

    Ok(InferenceEngine::new(
        model,
        Arc::new(tokenizer),
        Arc::new(registry),
        config.inference.clone(),
    ))
}
