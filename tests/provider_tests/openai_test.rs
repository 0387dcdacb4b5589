use agentlang::{
    config::OpenAIProviderConfig,
    provider::{
        llm::{ChatMessage, CompletionProvider, CompletionRequest},
        llms::openai_chat::OpenAIChatProvider,
        secret::Credentials,
        types::ProviderKind,
    },
};
use futures::StreamExt;

use crate::should_run_external_api_tests;

fn request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system("Answer with a single word."),
            ChatMessage::user("What is the capital of Japan?"),
        ],
        model: "gpt-4o-mini".to_string(),
        temperature: 0.0,
        max_tokens: 20,
        tools: vec![],
    }
}

fn provider() -> OpenAIChatProvider {
    let credentials = Credentials::from_env();
    let api_key = credentials
        .api_key(ProviderKind::OpenAI)
        .expect("OPENAI_API_KEY must be set");
    OpenAIChatProvider::new(api_key, &OpenAIProviderConfig::default())
}

#[tokio::test]
async fn test_openai_complete() {
    if !should_run_external_api_tests() {
        return;
    }

    let response = provider().complete(&request()).await.unwrap();
    assert!(response.content.contains("Tokyo"));
    assert!(response.usage.is_some());
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn test_openai_stream() {
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
    assert!(text.contains("Tokyo"));
}
