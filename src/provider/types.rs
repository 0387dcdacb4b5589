use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Completion backend, selected from the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
}

impl ProviderKind {
    /// Case-insensitive substring match on the model name. OpenAI markers
    /// are checked first; unknown models go to OpenAI.
    pub fn detect(model: &str) -> Self {
        let model = model.to_lowercase();
        if ["gpt", "o1", "o3"].iter().any(|m| model.contains(m)) {
            ProviderKind::OpenAI
        } else if ["claude", "sonnet", "opus", "haiku"]
            .iter()
            .any(|m| model.contains(m))
        {
            ProviderKind::Anthropic
        } else {
            ProviderKind::OpenAI
        }
    }

    /// Environment variable holding this backend's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}
