//! Configuration for promptline
//!
//! Loaded from TOML with `{{ env.VAR }}` placeholder expansion.

#![allow(clippy::must_use_candidate)]

mod env;
pub mod inference;
mod loader;
pub mod telemetry;
pub mod templates;

use serde::Deserialize;

pub use env::ExpandError;
pub use inference::*;
pub use telemetry::*;
pub use templates::*;

/// Top-level promptline configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Decode defaults
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Model id to template family rules, first match wins
    #[serde(default)]
    pub templates: Vec<TemplateRule>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
