use thiserror::Error;

/// Errors that can occur while preparing, running, or parsing a generation
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Forced tool choice names a tool that was never declared
    #[error("invalid value for 'tool_choice': no function named {name} was specified in the 'tools' parameter")]
    InvalidToolChoice { name: String },

    /// Request parameters outside their valid range
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No prompt template is known for the tokenizer's model family
    #[error("no prompt template matches model: {model}")]
    TemplateResolution { model: String },

    /// Generated text could not be interpreted by the template
    #[error("malformed assistant response: {0}")]
    MalformedResponse(String),

    /// Tokenizer collaborator failed to encode or decode
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Model collaborator failed during generation
    #[error("model error: {0}")]
    Model(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl InferenceError {
    /// Stable machine-readable identifier for the error kind
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidToolChoice { .. } => "invalid_tool_choice",
            Self::InvalidRequest(_) => "invalid_request",
            Self::TemplateResolution { .. } => "template_resolution_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Tokenizer(_) => "tokenizer_error",
            Self::Model(_) => "model_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller supplied an unusable request
    ///
    /// Every other kind originates from a collaborator or the generated output.
    pub const fn is_usage_error(&self) -> bool {
        matches!(self, Self::InvalidToolChoice { .. } | Self::InvalidRequest(_))
    }
}
