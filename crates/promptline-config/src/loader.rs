use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a template pattern is not a valid regex or a
    /// decode default is out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_inference()?;
        self.validate_templates()?;
        Ok(())
    }

    fn validate_inference(&self) -> anyhow::Result<()> {
        let inference = &self.inference;

        if inference.max_new_tokens == 0 {
            anyhow::bail!("inference.max_new_tokens must be greater than 0");
        }

        if !(inference.temperature >= 0.0 && inference.temperature.is_finite()) {
            anyhow::bail!("inference.temperature must be a finite value >= 0");
        }

        if !(inference.min_temperature > 0.0 && inference.min_temperature.is_finite()) {
            anyhow::bail!("inference.min_temperature must be a finite value > 0");
        }

        if inference.stop.iter().any(String::is_empty) {
            anyhow::bail!("inference.stop must not contain empty markers");
        }

        Ok(())
    }

    fn validate_templates(&self) -> anyhow::Result<()> {
        for (index, rule) in self.templates.iter().enumerate() {
            regex::Regex::new(&rule.pattern)
                .map_err(|e| anyhow::anyhow!("invalid pattern for templates[{index}] '{}': {e}", rule.pattern))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;

    use crate::{ComputeTarget, Config, LogFormat, TemplateFamily};

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.inference.max_new_tokens, 256);
        assert_eq!(config.inference.device, ComputeTarget::Cpu);
        assert!(config.templates.is_empty());
        assert_eq!(config.telemetry.format, LogFormat::Text);
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(indoc! {r#"
            [inference]
            device = "cuda:0"
            temperature = 0.2
            max_new_tokens = 512
            stop = ["<|im_end|>"]

            [[templates]]
            pattern = "functionary-7b-v1"
            family = "v1"
            strip_leading_token = 29871

            [[templates]]
            pattern = "functionary-.*-v2"
            family = "v2"

            [telemetry]
            filter = "promptline=debug"
            format = "json"
        "#})
        .unwrap();

        assert_eq!(config.inference.device, ComputeTarget::Cuda(0));
        assert_eq!(config.inference.max_new_tokens, 512);
        assert_eq!(config.inference.stop, vec!["<|im_end|>".to_owned()]);
        assert_eq!(config.templates.len(), 2);
        assert_eq!(config.templates[0].family, TemplateFamily::V1);
        assert_eq!(config.templates[0].strip_leading_token, Some(29871));
        assert_eq!(config.templates[1].strip_leading_token, None);
        assert_eq!(config.telemetry.filter.as_deref(), Some("promptline=debug"));
        assert_eq!(config.telemetry.format, LogFormat::Json);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[inference]\nbeam_width = 4\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn invalid_device_is_rejected() {
        let err = Config::parse("[inference]\ndevice = \"tpu:0\"\n").unwrap_err();
        assert!(err.to_string().contains("tpu:0"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cases = [
            "[inference]\nmax_new_tokens = 0\n",
            "[inference]\ntemperature = -1.0\n",
            "[inference]\nmin_temperature = 0.0\n",
            "[inference]\nstop = [\"\"]\n",
            "[[templates]]\npattern = \"(unclosed\"\nfamily = \"v2\"\n",
        ];

        for raw in cases {
            assert!(Config::parse(raw).is_err(), "expected rejection for {raw:?}");
        }
    }

    #[test]
    fn load_expands_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[inference]\ndevice = \"{{{{ env.PL_LOAD_DEVICE }}}}\"").unwrap();

        temp_env::with_var("PL_LOAD_DEVICE", Some("metal"), || {
            let config = Config::load(file.path()).unwrap();
            assert_eq!(config.inference.device, ComputeTarget::Metal);
        });
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(std::path::Path::new("/nonexistent/promptline.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
