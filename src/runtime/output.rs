use crate::provider::llm::{CompletionResponse, ToolCall, Usage};
use crate::value::{Properties, Value};

use super::agent::Agent;

/// Result of one agent invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub agent: String,
    pub model: String,
    pub output: String,
    pub params: Properties,
    pub usage: Option<Usage>,
    /// Requested by the model, never executed.
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    /// Set when a provider call failed and the output was mocked instead.
    pub error: Option<String>,
    pub mock: bool,
}

impl AgentOutput {
    pub fn mock(agent: &Agent, task: &str, params: Properties) -> Self {
        Self {
            agent: agent.name.clone(),
            model: agent.model.clone(),
            output: agent.mock_output(task),
            params,
            usage: None,
            tool_calls: vec![],
            finish_reason: None,
            error: None,
            mock: true,
        }
    }

    pub fn degraded(agent: &Agent, task: &str, params: Properties, error: String) -> Self {
        Self {
            output: format!(
                "[MOCK RESPONSE from {} - provider error: {}] Task: {}",
                agent.name, error, task
            ),
            error: Some(error),
            ..Self::mock(agent, task, params)
        }
    }

    pub fn from_response(agent: &Agent, params: Properties, response: CompletionResponse) -> Self {
        Self {
            agent: agent.name.clone(),
            model: if response.model.is_empty() {
                agent.model.clone()
            } else {
                response.model
            },
            output: response.content,
            params,
            usage: response.usage,
            tool_calls: response.tool_calls,
            finish_reason: response.finish_reason,
            error: None,
            mock: false,
        }
    }

    /// Input for the next pipeline step.
    pub fn next_input(&self) -> Properties {
        let mut input = Properties::new();
        input.insert("task".into(), self.output.as_str().into());
        input.insert("context".into(), self.to_value());
        input
    }

    pub fn to_value(&self) -> Value {
        let mut value = Properties::new();
        value.insert("agent".into(), self.agent.as_str().into());
        value.insert("model".into(), self.model.as_str().into());
        value.insert("output".into(), self.output.as_str().into());
        value.insert("params".into(), Value::Map(self.params.clone()));
        if let Some(usage) = &self.usage {
            value.insert("usage".into(), usage.to_json().into());
        }
        if !self.tool_calls.is_empty() {
            value.insert(
                "tool_calls".into(),
                Value::List(self.tool_calls.iter().map(|c| c.to_json().into()).collect()),
            );
        }
        if let Some(reason) = &self.finish_reason {
            value.insert("finish_reason".into(), reason.as_str().into());
        }
        if let Some(error) = &self.error {
            value.insert("error".into(), error.as_str().into());
        }
        value.insert("mock".into(), self.mock.into());
        Value::Map(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub pipeline: String,
    /// The input that would feed a further step: `{task, context}` of the last result.
    pub output: Properties,
    pub results: Vec<AgentOutput>,
}

impl PipelineOutput {
    pub fn to_value(&self) -> Value {
        let mut value = Properties::new();
        value.insert("pipeline".into(), self.pipeline.as_str().into());
        value.insert("output".into(), Value::Map(self.output.clone()));
        value.insert(
            "results".into(),
            Value::List(self.results.iter().map(AgentOutput::to_value).collect()),
        );
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_mock_value() {
        let agent = Agent::new("writer", "gpt-4");
        let output = AgentOutput::mock(&agent, "draft", Properties::new());
        assert_eq!(
            serde_json::Value::from(&output.to_value()),
            json!({
                "agent": "writer",
                "model": "gpt-4",
                "output": "[MOCK RESPONSE from writer] Task: draft",
                "params": {},
                "mock": true
            })
        );
    }

    #[test]
    fn test_degraded_output() {
        let agent = Agent::new("writer", "claude");
        let output = AgentOutput::degraded(&agent, "draft", Properties::new(), "boom".into());
        assert_eq!(
            output.output,
            "[MOCK RESPONSE from writer - provider error: boom] Task: draft"
        );
        assert_eq!(output.error.as_deref(), Some("boom"));
        assert!(output.mock);
    }

    #[test]
    fn test_response_value() {
        let agent = Agent::new("writer", "gpt-4");
        let response = CompletionResponse {
            content: "done".into(),
            tool_calls: vec![ToolCall::function("c1", "web_search", json!({"query": "x"}))],
            model: "gpt-4-0613".into(),
            usage: Some(Usage::new(3, 4)),
            finish_reason: Some("tool_calls".into()),
        };
        let output = AgentOutput::from_response(&agent, Properties::new(), response);
        let value = serde_json::Value::from(&output.to_value());
        assert_eq!(value["model"], "gpt-4-0613");
        assert_eq!(value["usage"]["total_tokens"], 7);
        assert_eq!(value["tool_calls"][0]["function"]["name"], "web_search");
        assert_eq!(value["finish_reason"], "tool_calls");
        assert_eq!(value["mock"], false);
    }

    #[test]
    fn test_next_input() {
        let agent = Agent::new("writer", "gpt-4");
        let output = AgentOutput::mock(&agent, "draft", Properties::new());
        let next = output.next_input();
        assert_eq!(next.get("task"), Some(&Value::from(output.output.as_str())));
        assert_eq!(next.get("context"), Some(&output.to_value()));
    }
}
