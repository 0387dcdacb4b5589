use crate::value::{Properties, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub name: String,
    /// Agent names, run in this order.
    pub agents: Vec<String>,
    pub error_handling: Option<Properties>,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        agents: Vec<String>,
        error_handling: Option<Properties>,
    ) -> Self {
        Self {
            name: name.into(),
            agents,
            error_handling,
        }
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_handling
            .as_ref()
            .map(ErrorPolicy::from_properties)
            .unwrap_or_default()
    }
}

/// Typed view of a pipeline's `on_error` block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorPolicy {
    /// Read and reported; steps are not re-invoked.
    pub retry: u32,
    /// Agent run in place of a failed step.
    pub fallback: Option<String>,
}

impl ErrorPolicy {
    pub fn from_properties(properties: &Properties) -> Self {
        Self {
            retry: properties
                .get("retry")
                .and_then(Value::as_i64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            fallback: properties
                .get("fallback")
                .filter(|v| !v.is_empty())
                .map(Value::to_string),
        }
    }
}
