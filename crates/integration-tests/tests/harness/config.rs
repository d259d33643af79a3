//! Programmatic configuration builder for integration tests

use promptline_config::{Config, TemplateFamily, TemplateRule};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Defaults with no template rules
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Map model ids matching `pattern` to `family`
    pub fn with_rule(mut self, pattern: &str, family: TemplateFamily) -> Self {
        self.config.templates.push(TemplateRule {
            pattern: pattern.to_owned(),
            family,
            strip_leading_token: None,
        });
        self
    }

    /// Map model ids matching `pattern` to `family`, stripping a boundary token from stop markers
    pub fn with_corrected_rule(mut self, pattern: &str, family: TemplateFamily, token_id: u32) -> Self {
        self.config.templates.push(TemplateRule {
            pattern: pattern.to_owned(),
            family,
            strip_leading_token: Some(token_id),
        });
        self
    }

    /// Add a stop marker applied to every request
    pub fn with_stop(mut self, marker: &str) -> Self {
        self.config.inference.stop.push(marker.to_owned());
        self
    }

    /// Set the default generation ceiling
    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.config.inference.max_new_tokens = max_new_tokens;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test configuration");
        self.config
    }
}
