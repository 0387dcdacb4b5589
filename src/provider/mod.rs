//! Completion providers.
//!
//! [`llm::CompletionProvider`] is the capability every backend implements.
//! Backends are chosen with [`types::ProviderKind::detect`] and built by
//! [`create_provider`] once the matching API key is known.

use std::sync::Arc;

use tracing::info;

use crate::config::ProviderConfigs;

pub mod llm;
pub mod llms;
pub mod secret;
pub mod types;

use llm::CompletionProvider;
use llms::{anthropic::AnthropicProvider, openai_chat::OpenAIChatProvider};
use secret::Credentials;
use types::{ProviderError, ProviderKind, ProviderResult};

pub fn create_provider(
    kind: ProviderKind,
    credentials: &Credentials,
    configs: &ProviderConfigs,
) -> ProviderResult<Arc<dyn CompletionProvider>> {
    let api_key = credentials.api_key(kind).ok_or_else(|| {
        ProviderError::Configuration(format!("{} is not set", kind.api_key_var()))
    })?;
    info!("Creating {} provider", kind);
    let provider: Arc<dyn CompletionProvider> = match kind {
        ProviderKind::OpenAI => Arc::new(OpenAIChatProvider::new(api_key, &configs.openai)),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(api_key, &configs.anthropic)),
    };
    Ok(provider)
}
