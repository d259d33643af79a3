use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, overrides the command-line default
    #[serde(default)]
    pub filter: Option<String>,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
