use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Decode defaults applied when a request leaves them unset
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Device the model runs on
    #[serde(default)]
    pub device: ComputeTarget,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens generated per request
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    /// Temperature substituted for a requested temperature of exactly zero
    #[serde(default = "default_min_temperature")]
    pub min_temperature: f64,
    /// Stop markers added to every request
    #[serde(default)]
    pub stop: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: ComputeTarget::default(),
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
            min_temperature: default_min_temperature(),
            stop: Vec::new(),
        }
    }
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_max_new_tokens() -> u32 {
    256
}

const fn default_min_temperature() -> f64 {
    0.001
}

/// Resolved compute device, written as `cpu`, `metal`, or `cuda:N`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ComputeTarget {
    /// Host CPU
    #[default]
    Cpu,
    /// CUDA device by ordinal
    Cuda(u32),
    /// Apple Metal
    Metal,
}

impl FromStr for ComputeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cpu" => Ok(Self::Cpu),
            "metal" | "mps" => Ok(Self::Metal),
            "cuda" => Ok(Self::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(Self::Cuda)
                .ok_or_else(|| format!("unknown device `{other}`, expected cpu, metal, or cuda:N")),
        }
    }
}

impl TryFrom<String> for ComputeTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ComputeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
            Self::Metal => f.write_str("metal"),
        }
    }
}
