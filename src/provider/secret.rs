use secrecy::SecretString;

use super::types::ProviderKind;

pub const MOCK_ENV_VAR: &str = "AGENTLANG_MOCK_LLM";

/// API keys available to the runtime. Keys are never logged; `Debug` on
/// [`SecretString`] is redacted.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<SecretString>,
    pub anthropic_api_key: Option<SecretString>,
    pub force_mock: bool,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |kind: ProviderKind| {
            lookup(kind.api_key_var())
                .filter(|value| !value.is_empty())
                .map(SecretString::from)
        };
        Self {
            openai_api_key: key(ProviderKind::OpenAI),
            anthropic_api_key: key(ProviderKind::Anthropic),
            force_mock: lookup(MOCK_ENV_VAR).is_some_and(|value| is_truthy(&value)),
        }
    }

    /// No credentials at all, completions are mocked.
    pub fn mock() -> Self {
        Self {
            force_mock: true,
            ..Self::default()
        }
    }

    pub fn api_key(&self, kind: ProviderKind) -> Option<&SecretString> {
        match kind {
            ProviderKind::OpenAI => self.openai_api_key.as_ref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_ref(),
        }
    }

    /// Mock mode: forced, or no key for either backend.
    pub fn use_mock(&self) -> bool {
        self.force_mock || (self.openai_api_key.is_none() && self.anthropic_api_key.is_none())
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "" | "0" | "false" | "no"
    )
}
