use tracing::warn;

use crate::value::{Properties, Value};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub name: String,
    pub model: String,
    pub prompt: String,
    /// Tool names in declaration order.
    pub tools: Vec<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub on_error: Option<Value>,
}

impl Agent {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            prompt: String::new(),
            tools: vec![],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            on_error: None,
        }
    }

    /// Builds an agent from its declaration block. `default_model` is used
    /// when the block has no `model`.
    pub fn from_properties(name: &str, properties: &Properties, default_model: &str) -> Self {
        let text = |key: &str| properties.get(key).map(Value::to_string);
        Self {
            name: name.to_string(),
            model: text("model").unwrap_or_else(|| default_model.to_string()),
            prompt: text("prompt").unwrap_or_default(),
            tools: match properties.get("tools") {
                Some(Value::List(items)) => items.iter().map(Value::to_string).collect(),
                Some(Value::String(single)) => vec![single.clone()],
                _ => vec![],
            },
            temperature: properties
                .get("temperature")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: properties
                .get("max_tokens")
                .map_or(DEFAULT_MAX_TOKENS, |value| {
                    token_limit(value).unwrap_or_else(|| {
                        warn!(
                            "Agent {}: invalid max_tokens {}, using {}",
                            name, value, DEFAULT_MAX_TOKENS
                        );
                        DEFAULT_MAX_TOKENS
                    })
                }),
            on_error: properties.get("on_error").cloned(),
        }
    }

    pub fn mock_output(&self, task: &str) -> String {
        format!("[MOCK RESPONSE from {}] Task: {}", self.name, task)
    }

    pub fn to_value(&self) -> Value {
        let mut value = Properties::new();
        value.insert("name".into(), self.name.as_str().into());
        value.insert("model".into(), self.model.as_str().into());
        value.insert("prompt".into(), self.prompt.as_str().into());
        value.insert(
            "tools".into(),
            Value::List(self.tools.iter().map(|t| t.as_str().into()).collect()),
        );
        value.insert("temperature".into(), self.temperature.into());
        value.insert("max_tokens".into(), Value::Integer(self.max_tokens.into()));
        if let Some(on_error) = &self.on_error {
            value.insert("on_error".into(), on_error.clone());
        }
        Value::Map(value)
    }
}

/// Whole, non-negative numbers that fit in `u32`; `2000.0` counts.
fn token_limit(value: &Value) -> Option<u32> {
    match value {
        Value::Integer(n) => u32::try_from(*n).ok(),
        Value::Float(x) if x.fract() == 0.0 && *x >= 0.0 && *x <= f64::from(u32::MAX) => {
            Some(*x as u32)
        }
        _ => None,
    }
}

/// The user message for a run: `task`, else `message`, else the whole
/// parameter block rendered as text.
pub fn task_text(params: &Properties) -> String {
    ["task", "message"]
        .iter()
        .filter_map(|key| params.get(*key))
        .find(|value| !value.is_empty())
        .map(Value::to_string)
        .unwrap_or_else(|| Value::Map(params.clone()).to_string())
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
    fn test_defaults() {
        let agent = Agent::from_properties("a", &Properties::new(), "claude-3-haiku");
        assert_eq!(agent, Agent::new("a", "claude-3-haiku"));
        assert_eq!(agent.temperature, 0.7);
        assert_eq!(agent.max_tokens, 2000);
    }

    #[test]
    fn test_from_properties() {
        let agent = Agent::from_properties(
            "researcher",
            &props(&[
                ("model", "gpt-4o".into()),
                ("prompt", "Research things".into()),
                ("tools", Value::List(vec!["web_search".into(), "read_file".into()])),
                ("temperature", Value::Integer(1)),
                ("max_tokens", Value::Integer(500)),
            ]),
            DEFAULT_MODEL,
        );
        assert_eq!(agent.model, "gpt-4o");
        assert_eq!(agent.tools, vec!["web_search", "read_file"]);
        assert_eq!(agent.temperature, 1.0);
        assert_eq!(agent.max_tokens, 500);
    }

    #[test]
    fn test_negative_max_tokens_uses_default() {
        let agent = Agent::from_properties(
            "a",
            &props(&[("max_tokens", Value::Integer(-1))]),
            DEFAULT_MODEL,
        );
        assert_eq!(agent.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_float_max_tokens() {
        let max_tokens = |value: Value| {
            Agent::from_properties("a", &props(&[("max_tokens", value)]), DEFAULT_MODEL).max_tokens
        };
        assert_eq!(max_tokens(Value::Float(1500.0)), 1500);
        assert_eq!(max_tokens(Value::Float(1500.5)), DEFAULT_MAX_TOKENS);
        assert_eq!(max_tokens(Value::Float(-3.0)), DEFAULT_MAX_TOKENS);
        assert_eq!(max_tokens(Value::Float(1e12)), DEFAULT_MAX_TOKENS);
        assert_eq!(max_tokens("lots".into()), DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_task_text() {
        assert_eq!(task_text(&props(&[("task", "hello".into())])), "hello");
        assert_eq!(
            task_text(&props(&[("task", "".into()), ("message", "hi".into())])),
            "hi"
        );
        assert_eq!(
            task_text(&props(&[("topic", "rust".into()), ("depth", Value::Integer(2))])),
            "{topic: \"rust\", depth: 2}"
        );
        assert_eq!(task_text(&Properties::new()), "{}");
    }
}
