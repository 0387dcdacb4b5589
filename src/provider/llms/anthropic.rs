use std::fmt;

use async_trait::async_trait;
use eventsource_stream::{Event, Eventsource};
use futures::{stream::BoxStream, Stream, StreamExt};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::AnthropicProviderConfig;
use crate::provider::{
    llm::{CompletionProvider, CompletionRequest, CompletionResponse, Role, ToolCall, Usage},
    types::{ProviderError, ProviderKind, ProviderResult},
};

/// Messages API backend over plain HTTP.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    api_version: String,
}

impl AnthropicProvider {
    pub fn new(api_key: &SecretString, config: &AnthropicProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        }
    }

    async fn post(&self, body: serde_json::Value) -> ProviderResult<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, text))
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    #[tracing::instrument(level = "debug", skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse> {
        let response = self.post(request_body(request, false)).await?;
        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Invalid response body: {}", e)))?;
        let response = parse_response(body);
        debug!(
            "completion finished: {:?}, {} tool calls",
            response.finish_reason,
            response.tool_calls.len()
        );
        Ok(response)
    }

    #[tracing::instrument(level = "debug", skip(self, request), fields(model = %request.model))]
    async fn stream(
        &self,
        request: &CompletionRequest,
    ) -> ProviderResult<BoxStream<'static, ProviderResult<String>>> {
        let response = self.post(request_body(request, true)).await?;
        Ok(text_deltas(response.bytes_stream()).boxed())
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

fn status_error(status: StatusCode, body: String) -> ProviderError {
    let message = format!("{}: {}", status, body);
    match status {
        StatusCode::UNAUTHORIZED => ProviderError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimit(message),
        StatusCode::BAD_REQUEST => ProviderError::InvalidRequest(message),
        _ => ProviderError::Api(message),
    }
}

/// System messages go into the top-level `system` field, joined by newlines.
fn request_body(request: &CompletionRequest, stream: bool) -> serde_json::Value {
    let system = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let messages = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "assistant",
                _ => "user",
            };
            json!({"role": role, "content": m.content})
        })
        .collect::<Vec<_>>();

    let mut body = json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": messages,
    });
    let system = system.trim();
    if !system.is_empty() {
        body["system"] = json!(system);
    }
    if !request.tools.is_empty() {
        body["tools"] = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.parameters,
                })
            })
            .collect();
    }
    if stream {
        body["stream"] = json!(true);
    }
    body
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

fn parse_response(response: MessagesResponse) -> CompletionResponse {
    let mut content = String::new();
    let mut tool_calls = vec![];
    for block in response.content {
        match block {
            ContentBlock::Text { text } => content.push_str(&text),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall::function(id, name, input))
            }
            ContentBlock::Other => {}
        }
    }
    CompletionResponse {
        content,
        tool_calls,
        model: response.model,
        usage: response
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens)),
        finish_reason: response.stop_reason,
    }
}

/// Text deltas and error events of a Messages API event stream, in order.
fn text_deltas<S, B, E>(bytes: S) -> impl Stream<Item = ProviderResult<String>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    bytes.eventsource().filter_map(|event| {
        futures::future::ready(match event {
            Ok(event) => event_delta(&event),
            Err(e) => Some(Err(ProviderError::Stream(e.to_string()))),
        })
    })
}

fn event_delta(event: &Event) -> Option<ProviderResult<String>> {
    let data: serde_json::Value = match serde_json::from_str(&event.data) {
        Ok(data) => data,
        Err(e) => {
            debug!("skipping {} event: {}", event.event, e);
            return None;
        }
    };
    match data["type"].as_str() {
        Some("content_block_delta") if data["delta"]["type"] == "text_delta" => data["delta"]
            ["text"]
            .as_str()
            .map(|text| Ok(text.to_string())),
        Some("error") => {
            let message = data["error"]["message"]
                .as_str()
                .unwrap_or("unknown stream error");
            Some(Err(ProviderError::Stream(message.to_string())))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::llm::{ChatMessage, ToolSpec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_body() {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system("be brief"),
                ChatMessage::system("answer in English"),
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi"),
            ],
            model: "claude-3-5-sonnet-latest".to_string(),
            temperature: 0.2,
            max_tokens: 512,
            tools: vec![ToolSpec {
                name: "read_file".to_string(),
                description: "Read a file".to_string(),
                parameters: json!({"type": "object"}),
            }],
        };
        let body = request_body(&request, false);
        assert_eq!(body["system"], "be brief\nanswer in English");
        assert_eq!(
            body["messages"],
            json!([
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "hi"}
            ])
        );
        assert_eq!(body["tools"][0]["input_schema"], json!({"type": "object"}));
        assert!(body.get("stream").is_none());
        assert_eq!(request_body(&request, true)["stream"], true);
    }

    #[test]
    fn test_request_body_without_system() {
        let request = CompletionRequest {
            messages: vec![ChatMessage::user("hello")],
            model: "claude".to_string(),
            temperature: 0.7,
            max_tokens: 10,
            tools: vec![],
        };
        let body = request_body(&request, false);
        assert!(body.get("system").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "Let me search."},
                {"type": "tool_use", "id": "toolu_1", "name": "web_search", "input": {"query": "rust"}},
                {"type": "thinking", "thinking": "..."}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 9}
        }))
        .unwrap();
        let response = parse_response(body);
        assert_eq!(response.content, "Let me search.");
        assert_eq!(response.finish_reason.as_deref(), Some("tool_use"));
        assert_eq!(response.usage, Some(Usage::new(20, 9)));
        assert_eq!(
            response.tool_calls,
            vec![ToolCall::function("toolu_1", "web_search", json!({"query": "rust"}))]
        );
    }

    #[test]
    fn test_status_error() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ProviderError::RateLimit(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, String::new()),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            ProviderError::Api(_)
        ));
    }

    async fn collect_deltas(chunks: Vec<&'static str>) -> Vec<ProviderResult<String>> {
        let bytes = futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
        text_deltas(bytes).collect().await
    }

    #[tokio::test]
    async fn test_text_deltas_in_order() {
        let deltas = collect_deltas(vec![concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"lo\"}}\n\n",
            "event: ping\n",
            "data: {\"type\":\"ping\"}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        )])
        .await;
        assert_eq!(deltas, vec![Ok("Hel".to_string()), Ok("lo".to_string())]);
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let deltas = collect_deltas(vec![
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"te",
            "xt_delta\",\"text\":\"hi\"}}\n",
            "\n",
        ])
        .await;
        assert_eq!(deltas, vec![Ok("hi".to_string())]);
    }

    #[tokio::test]
    async fn test_event_with_multiline_data() {
        let deltas = collect_deltas(vec![concat!(
            "data: {\"type\":\"content_block_delta\",\n",
            "data: \"delta\":{\"type\":\"text_delta\",\"text\":\"hi\"}}\n",
            "\n",
        )])
        .await;
        assert_eq!(deltas, vec![Ok("hi".to_string())]);
    }

    #[tokio::test]
    async fn test_error_event() {
        let deltas = collect_deltas(vec![
            "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
        ])
        .await;
        assert_eq!(
            deltas,
            vec![Err(ProviderError::Stream("Overloaded".to_string()))]
        );
    }
}
