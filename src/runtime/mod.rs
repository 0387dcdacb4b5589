//! # Runtime
//!
//! Owns every entity a program defines and executes agents, pipelines and
//! tools. One [`Runtime`] is one program run: registries, variables and the
//! `config` map live here and nowhere else.
//!
//! Agents call a [`CompletionProvider`] chosen from their model name. Without
//! credentials (or with mock mode forced) agents answer with a mock response
//! instead, and provider failures degrade to an annotated mock response
//! rather than aborting the run.

use std::{collections::HashMap, sync::Arc};

use futures::{stream::BoxStream, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{ProviderConfigs, SystemConfig};
use crate::provider::{
    create_provider,
    llm::{ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse},
    secret::Credentials,
    types::{ProviderError, ProviderKind, ProviderResult},
};
use crate::value::{Properties, Value};

pub mod agent;
pub mod output;
pub mod pipeline;
pub mod tool;

use agent::{task_text, Agent, DEFAULT_MODEL};
use output::{AgentOutput, PipelineOutput};
use pipeline::Pipeline;
use tool::{builtin_tools, Tool, ToolError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Unknown target: {0}")]
    UnknownTarget(String),
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

pub struct Runtime {
    agents: HashMap<String, Agent>,
    tools: HashMap<String, Tool>,
    pipelines: HashMap<String, Pipeline>,
    variables: HashMap<String, Value>,
    config: Properties,
    credentials: Credentials,
    provider_configs: ProviderConfigs,
    force_mock: bool,
    providers: HashMap<ProviderKind, Arc<dyn CompletionProvider>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(SystemConfig::default(), Credentials::default())
    }
}

impl Runtime {
    pub fn new(config: SystemConfig, credentials: Credentials) -> Self {
        let mut runtime = Self {
            agents: HashMap::new(),
            tools: HashMap::new(),
            pipelines: HashMap::new(),
            variables: HashMap::new(),
            config: config.initial_settings(),
            credentials,
            provider_configs: config.providers,
            force_mock: config.mock,
            providers: HashMap::new(),
        };
        for tool in builtin_tools() {
            runtime.register_tool(tool);
        }
        runtime
    }

    /// Uses `provider` for every model of its kind instead of building a client.
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn is_mock(&self) -> bool {
        self.force_mock || self.credentials.use_mock()
    }

    pub fn register_agent(&mut self, agent: Agent) {
        info!("Registered agent: {}", agent.name);
        self.agents.insert(agent.name.clone(), agent);
    }

    pub fn register_tool(&mut self, tool: Tool) {
        info!("Registered tool: {}", tool.name);
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn register_pipeline(&mut self, pipeline: Pipeline) {
        info!(
            "Registered pipeline: {} ({} agents)",
            pipeline.name,
            pipeline.agents.len()
        );
        self.pipelines.insert(pipeline.name.clone(), pipeline);
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.get(name)
    }

    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    pub fn config(&self) -> &Properties {
        &self.config
    }

    /// Merges `settings` into the config map; later keys overwrite.
    pub fn update_config(&mut self, settings: &Properties) {
        for (key, value) in settings {
            self.config.insert(key.clone(), value.clone());
        }
        info!("Updated config: {}", crate::value::Value::Map(settings.clone()));
    }

    /// Model for agents that declare none.
    pub fn default_model(&self) -> String {
        self.config
            .get("default_model")
            .filter(|v| !v.is_null())
            .map(Value::to_string)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        info!("Set variable {} = {}", name, value);
        self.variables.insert(name.to_string(), value);
    }

    pub fn get_variable(&self, name: &str) -> RuntimeResult<&Value> {
        self.variables
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownVariable(name.to_string()))
    }

    /// Replaces top-level string values naming a bound variable with that
    /// variable's value. Nested values are left alone.
    pub fn resolve_params(&self, params: &Properties) -> Properties {
        params
            .iter()
            .map(|(key, value)| {
                let resolved = match value {
                    Value::String(name) => self.variables.get(name).unwrap_or(value),
                    _ => value,
                };
                (key.clone(), resolved.clone())
            })
            .collect()
    }

    pub fn invoke_tool(&self, name: &str, args: &Properties) -> RuntimeResult<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownTool(name.to_string()))?;
        debug!("Invoking tool {}", name);
        Ok(tool.call(args)?)
    }

    #[tracing::instrument(level = "debug", skip(self, params))]
    pub async fn run_agent(&mut self, name: &str, params: Properties) -> RuntimeResult<AgentOutput> {
        let agent = self
            .agents
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownAgent(name.to_string()))?;
        info!("Running agent {} with params: {}", name, crate::value::Value::Map(params.clone()));

        let task = task_text(&params);
        if self.is_mock() {
            info!("Agent {} completed (mock)", name);
            return Ok(AgentOutput::mock(&agent, &task, params));
        }

        let request = self.completion_request(&agent, &task);
        let output = match self.complete(&request).await {
            Ok(response) => {
                for call in &response.tool_calls {
                    info!(
                        "Agent {} requested tool {} with {}",
                        name, call.name, call.arguments
                    );
                }
                AgentOutput::from_response(&agent, params, response)
            }
            Err(e) => {
                warn!("Provider call for agent {} failed: {}", name, e);
                AgentOutput::degraded(&agent, &task, params, e.to_string())
            }
        };
        info!("Agent {} completed", name);
        Ok(output)
    }

    /// Streams the agent's answer as text deltas. Mock mode yields the mock
    /// response as a single chunk.
    pub async fn stream_agent(
        &mut self,
        name: &str,
        params: Properties,
    ) -> RuntimeResult<BoxStream<'static, ProviderResult<String>>> {
        let agent = self
            .agents
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownAgent(name.to_string()))?;
        let task = task_text(&params);
        if self.is_mock() {
            let chunk = agent.mock_output(&task);
            return Ok(futures::stream::once(async move { Ok(chunk) }).boxed());
        }
        let request = self.completion_request(&agent, &task);
        let provider = self.provider(ProviderKind::detect(&request.model))?;
        Ok(provider.stream(&request).await?)
    }

    #[tracing::instrument(level = "debug", skip(self, params))]
    pub async fn run_pipeline(
        &mut self,
        name: &str,
        params: Properties,
    ) -> RuntimeResult<PipelineOutput> {
        let pipeline = self
            .pipelines
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownPipeline(name.to_string()))?;
        let policy = pipeline.error_policy();
        info!(
            "Running pipeline {} with {} agents",
            name,
            pipeline.agents.len()
        );

        let mut current = params;
        let mut results = Vec::with_capacity(pipeline.agents.len());
        for agent_name in &pipeline.agents {
            let result = match self.run_agent(agent_name, current.clone()).await {
                Ok(result) => result,
                Err(e) => {
                    error!(
                        "Error in pipeline {} at agent {}: {}",
                        name, agent_name, e
                    );
                    if policy.retry > 0 {
                        warn!(
                            "Retry requested for {} ({} attempts); retries are not performed",
                            agent_name, policy.retry
                        );
                    }
                    let Some(fallback) = &policy.fallback else {
                        return Err(e);
                    };
                    info!("Using fallback: {}", fallback);
                    self.run_agent(fallback, current.clone()).await?
                }
            };
            current = result.next_input();
            results.push(result);
        }

        Ok(PipelineOutput {
            pipeline: name.to_string(),
            output: current,
            results,
        })
    }

    fn completion_request(&self, agent: &Agent, task: &str) -> CompletionRequest {
        let mut messages = vec![];
        if !agent.prompt.is_empty() {
            messages.push(ChatMessage::system(&agent.prompt));
        }
        messages.push(ChatMessage::user(task));

        let tools = agent
            .tools
            .iter()
            .filter_map(|name| match self.tools.get(name) {
                Some(tool) => Some(tool.to_spec()),
                None => {
                    warn!("Agent {} lists unknown tool {}, skipping", agent.name, name);
                    None
                }
            })
            .collect();

        CompletionRequest {
            messages,
            model: agent.model.clone(),
            temperature: agent.temperature,
            max_tokens: agent.max_tokens,
            tools,
        }
    }

    async fn complete(&mut self, request: &CompletionRequest) -> ProviderResult<CompletionResponse> {
        let provider = self.provider(ProviderKind::detect(&request.model))?;
        provider.complete(request).await
    }

    /// Cached client for `kind`, created on first use.
    fn provider(&mut self, kind: ProviderKind) -> ProviderResult<Arc<dyn CompletionProvider>> {
        if let Some(provider) = self.providers.get(&kind) {
            return Ok(provider.clone());
        }
        let provider = create_provider(kind, &self.credentials, &self.provider_configs)?;
        self.providers.insert(kind, provider.clone());
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, Value)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_builtin_tools_registered() {
        let runtime = Runtime::default();
        for name in ["web_search", "read_file", "write_file", "http_get"] {
            assert!(runtime.tool(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn test_resolve_params() {
        let mut runtime = Runtime::default();
        runtime.set_variable("draft", Value::from("text"));
        let params = props(&[
            ("task", "draft".into()),
            ("other", "plain".into()),
            ("nested", Value::List(vec!["draft".into()])),
        ]);
        let resolved = runtime.resolve_params(&params);
        assert_eq!(resolved.get("task"), Some(&Value::from("text")));
        assert_eq!(resolved.get("other"), Some(&Value::from("plain")));
        assert_eq!(
            resolved.get("nested"),
            Some(&Value::List(vec!["draft".into()]))
        );
        assert_eq!(params.get("task"), Some(&Value::from("draft")));
    }

    #[test]
    fn test_get_variable() {
        let runtime = Runtime::default();
        assert_eq!(
            runtime.get_variable("missing"),
            Err(RuntimeError::UnknownVariable("missing".into()))
        );
    }

    #[test]
    fn test_update_config_merges() {
        let mut runtime = Runtime::default();
        runtime.update_config(&props(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]));
        runtime.update_config(&props(&[("b", Value::Integer(3))]));
        assert_eq!(
            runtime.config(),
            &props(&[("a", Value::Integer(1)), ("b", Value::Integer(3))])
        );
    }

    #[test]
    fn test_default_model() {
        let mut runtime = Runtime::default();
        assert_eq!(runtime.default_model(), "gpt-4");
        runtime.update_config(&props(&[("default_model", "claude-3-opus".into())]));
        assert_eq!(runtime.default_model(), "claude-3-opus");
    }

    #[test]
    fn test_completion_request_skips_unknown_tools() {
        let runtime = Runtime::default();
        let mut agent = Agent::new("a", "gpt-4");
        agent.tools = vec!["web_search".into(), "missing".into()];
        let request = runtime.completion_request(&agent, "go");
        assert_eq!(request.messages, vec![ChatMessage::user("go")]);
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "web_search");
    }

    #[tokio::test]
    async fn test_mock_agent() {
        let mut runtime = Runtime::default();
        runtime.register_agent(Agent::new("greeter", "gpt-4"));
        let output = runtime
            .run_agent("greeter", props(&[("task", "hello".into())]))
            .await
            .unwrap();
        assert_eq!(output.output, "[MOCK RESPONSE from greeter] Task: hello");
        assert!(output.mock);
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let mut runtime = Runtime::default();
        let result = runtime.run_agent("nobody", Properties::new()).await;
        assert_eq!(result, Err(RuntimeError::UnknownAgent("nobody".into())));
    }

    #[tokio::test]
    async fn test_mock_stream() {
        let mut runtime = Runtime::default();
        runtime.register_agent(Agent::new("greeter", "gpt-4"));
        let chunks: Vec<_> = runtime
            .stream_agent("greeter", props(&[("task", "hi".into())]))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(
            chunks,
            vec![Ok("[MOCK RESPONSE from greeter] Task: hi".to_string())]
        );
    }

    #[test]
    fn test_invoke_unknown_tool() {
        let runtime = Runtime::default();
        assert_eq!(
            runtime.invoke_tool("nope", &Properties::new()),
            Err(RuntimeError::UnknownTool("nope".into()))
        );
    }
}
