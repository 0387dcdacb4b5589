use agentlang::{
    config::{AnthropicProviderConfig, ProviderConfigs, SystemConfig},
    provider::{
        llm::{ChatMessage, CompletionProvider, CompletionRequest},
        llms::anthropic::AnthropicProvider,
        secret::Credentials,
        types::{ProviderError, ProviderKind},
    },
    system::System,
};
use futures::StreamExt;
use secrecy::SecretString;

use crate::should_run_external_api_tests;

fn request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system("Answer with a single word."),
            ChatMessage::user("What is the capital of France?"),
        ],
        model: "claude-3-5-haiku-latest".to_string(),
        temperature: 0.0,
        max_tokens: 20,
        tools: vec![],
    }
}

fn provider() -> AnthropicProvider {
    let credentials = Credentials::from_env();
    let api_key = credentials
        .api_key(ProviderKind::Anthropic)
        .expect("ANTHROPIC_API_KEY must be set");
    AnthropicProvider::new(api_key, &AnthropicProviderConfig::default())
}

#[tokio::test]
async fn test_anthropic_complete() {
    if !should_run_external_api_tests() {
        return;
    }

    let response = provider().complete(&request()).await.unwrap();
    assert!(response.content.contains("Paris"));
    assert!(response.usage.is_some());
}

#[tokio::test]
async fn test_anthropic_stream() {
    if !should_run_external_api_tests() {
        return;
    }

    let chunks: Vec<_> = provider()
        .stream(&request())
        .await
        .unwrap()
        .collect()
        .await;
    let text: String = chunks.into_iter().map(Result::unwrap).collect();
    assert!(text.contains("Paris"));
}

#[tokio::test]
async fn test_anthropic_invalid_key() {
    if !should_run_external_api_tests() {
        return;
    }

    let provider = AnthropicProvider::new(
        &SecretString::from("invalid-key"),
        &AnthropicProviderConfig::default(),
    );
    let result = provider.complete(&request()).await;
    assert!(matches!(result, Err(ProviderError::Authentication(_))));
}

#[tokio::test]
async fn test_agent_with_live_provider() {
    if !should_run_external_api_tests() {
        return;
    }

    let config = SystemConfig {
        providers: ProviderConfigs::default(),
        ..SystemConfig::default()
    };
    let mut system = System::from_env(config);
    let result = system
        .run_dsl(
            r#"
            agent capital {
                model: "claude-3-5-haiku-latest"
                prompt: "Answer with a single word."
                max_tokens: 20
            }
            run capital with { task: "What is the capital of Italy?" }
            "#,
        )
        .await
        .unwrap()
        .unwrap();
    let output = result.as_map().unwrap();
    assert!(output["output"].to_string().contains("Rome"));
    assert_eq!(output["mock"], agentlang::Value::Boolean(false));
}
