use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::OpenAIProviderConfig;
use crate::provider::{
    llm::{ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, Role, ToolCall, ToolSpec, Usage},
    types::{ProviderError, ProviderKind, ProviderResult},
};

/// Chat completions backend.
pub struct OpenAIChatProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAIChatProvider {
    pub fn new(api_key: &SecretString, config: &OpenAIProviderConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(&config.base_url);
        Self {
            client: Client::with_config(openai_config),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIChatProvider {
    #[tracing::instrument(level = "debug", skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse> {
        let chat_request = build_request(request, false)?;
        let response = self.client.chat().create(chat_request).await?;
        let response = parse_response(response)?;
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
        let chat_request = build_request(request, true)?;
        let stream = self.client.chat().create_stream(chat_request).await?;
        let deltas = stream
            .map(|chunk| {
                chunk
                    .map(|chunk| {
                        chunk
                            .choices
                            .into_iter()
                            .filter_map(|choice| choice.delta.content)
                            .collect::<String>()
                    })
                    .map_err(|e| ProviderError::Stream(e.to_string()))
            })
            .filter(|delta| futures::future::ready(!matches!(delta, Ok(text) if text.is_empty())));
        Ok(deltas.boxed())
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }
}

fn build_request(
    request: &CompletionRequest,
    stream: bool,
) -> ProviderResult<CreateChatCompletionRequest> {
    let messages = request
        .messages
        .iter()
        .map(to_openai_message)
        .collect::<ProviderResult<Vec<_>>>()?;

    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(&request.model)
        .messages(messages)
        .temperature(request.temperature as f32)
        .max_completion_tokens(request.max_tokens);
    if !request.tools.is_empty() {
        let tools = request
            .tools
            .iter()
            .map(to_openai_tool)
            .collect::<ProviderResult<Vec<_>>>()?;
        args.tools(tools);
    }
    if stream {
        args.stream(true);
    }
    Ok(args.build()?)
}

fn to_openai_message(message: &ChatMessage) -> ProviderResult<ChatCompletionRequestMessage> {
    let content = message.content.as_str();
    let message = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            args.content(content);
            if !message.tool_calls.is_empty() {
                args.tool_calls(
                    message
                        .tool_calls
                        .iter()
                        .map(to_openai_tool_call)
                        .collect::<Vec<_>>(),
                );
            }
            args.build()?.into()
        }
        Role::Tool => ChatCompletionRequestToolMessageArgs::default()
            .content(content)
            .tool_call_id(message.tool_call_id.clone().unwrap_or_default())
            .build()?
            .into(),
    };
    Ok(message)
}

fn to_openai_tool(tool: &ToolSpec) -> ProviderResult<ChatCompletionTool> {
    let function = FunctionObjectArgs::default()
        .name(&tool.name)
        .description(&tool.description)
        .parameters(tool.parameters.clone())
        .build()?;
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(function)
        .build()?)
}

fn to_openai_tool_call(call: &ToolCall) -> ChatCompletionMessageToolCall {
    let arguments = match &call.arguments {
        serde_json::Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments,
        },
    }
}

fn parse_response(response: CreateChatCompletionResponse) -> ProviderResult<CompletionResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Api("No choices in response".into()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            // arguments arrive as a JSON-encoded string
            let arguments = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::String(call.function.arguments));
            ToolCall::function(call.id, call.function.name, arguments)
        })
        .collect();

    let finish_reason = choice
        .finish_reason
        .and_then(|reason| serde_json::to_value(reason).ok())
        .and_then(|reason| reason.as_str().map(str::to_string));

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        model: response.model,
        usage: response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens)),
        finish_reason,
    })
}

impl From<OpenAIError> for ProviderError {
    fn from(error: OpenAIError) -> Self {
        match error {
            OpenAIError::ApiError(api) => {
                let kind = api.r#type.clone().unwrap_or_default();
                if matches!(kind.as_str(), "requests" | "tokens" | "insufficient_quota") {
                    ProviderError::RateLimit(api.message)
                } else if api.message.contains("API key") {
                    ProviderError::Authentication(api.message)
                } else {
                    ProviderError::Api(api.message)
                }
            }
            OpenAIError::InvalidArgument(message) => ProviderError::InvalidRequest(message),
            OpenAIError::StreamError(message) => ProviderError::Stream(message),
            other => ProviderError::Api(other.to_string()),
        }
    }
}
