use serde::Deserialize;

/// Prompt template families with a built-in implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFamily {
    /// `role:` headed turns with `<|END_OF_*|>` markers
    V1,
    /// `<|from|>` / `<|recipient|>` / `<|content|>` records
    V2,
}

/// Maps model identities to a template family
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateRule {
    /// Regex matched against the tokenizer's model id
    pub pattern: String,
    /// Template family used for matching models
    pub family: TemplateFamily,
    /// Boundary token id the tokenizer prepends to stop markers, stripped when present
    #[serde(default)]
    pub strip_leading_token: Option<u32>,
}
