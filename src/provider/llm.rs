use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::json;

use super::types::{ProviderKind, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// Tool offered to the model. `parameters` is a JSON schema object.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            kind: "function".to_string(),
            name: name.into(),
            arguments,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "type": self.kind,
            "function": {
                "name": self.name,
                "arguments": self.arguments,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "prompt_tokens": self.prompt_tokens,
            "completion_tokens": self.completion_tokens,
            "total_tokens": self.total_tokens,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub tools: Vec<ToolSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub model: String,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

#[mockall::automock]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse>;

    /// Text deltas in arrival order.
    async fn stream(
        &self,
        request: &CompletionRequest,
    ) -> ProviderResult<BoxStream<'static, ProviderResult<String>>>;

    fn kind(&self) -> ProviderKind;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_constructors() {
        let message = ChatMessage::tool("call_1", "42");
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(ChatMessage::system("be brief").role.to_string(), "system");
    }

    #[test]
    fn test_tool_call_json() {
        let call = ToolCall::function("call_1", "web_search", json!({"query": "rust"}));
        assert_eq!(
            call.to_json(),
            json!({
                "id": "call_1",
                "type": "function",
                "function": {"name": "web_search", "arguments": {"query": "rust"}}
            })
        );
    }

    #[test]
    fn test_usage_total() {
        assert_eq!(Usage::new(10, 5).total_tokens, 15);
        assert_eq!(Usage::new(u32::MAX, 1).total_tokens, u32::MAX);
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let mut provider = MockCompletionProvider::new();
        provider.expect_complete().returning(|request| {
            Ok(CompletionResponse {
                content: format!("echo {}", request.messages[0].content),
                model: request.model.clone(),
                ..Default::default()
            })
        });
        provider.expect_stream().returning(|_| {
            Ok(futures::stream::iter(vec![Ok("a".to_string()), Ok("b".to_string())]).boxed())
        });

        let request = CompletionRequest {
            messages: vec![ChatMessage::user("hi")],
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 100,
            tools: vec![],
        };
        let response = provider.complete(&request).await.unwrap();
        assert_eq!(response.content, "echo hi");

        let chunks: Vec<_> = provider
            .stream(&request)
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;
        assert_eq!(chunks, vec![Ok("a".to_string()), Ok("b".to_string())]);
    }
}
