use std::{fmt, path::Path, str::FromStr, sync::Arc};

use indexmap::IndexMap;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::provider::llm::ToolSpec;
use crate::value::{Properties, Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
    #[error("Tool handler failed: {0}")]
    Handler(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Bound at tool creation; receives the arguments after defaults are applied.
pub type ToolHandler = Arc<dyn Fn(&Properties) -> ToolResult<Value> + Send + Sync>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    List,
    Dict,
}

impl ParamType {
    /// JSON schema type name.
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "integer",
            ParamType::Float => "number",
            ParamType::Bool => "boolean",
            ParamType::List => "array",
            ParamType::Dict => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSpec {
    pub param_type: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn new(param_type: ParamType) -> Self {
        Self {
            param_type,
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reads a `{ type, required, default, description }` block. Unknown or
    /// missing types fall back to `string`.
    pub fn from_value(value: &Value) -> Self {
        let Some(block) = value.as_map() else {
            return Self::default();
        };
        let param_type = match block.get("type").and_then(Value::as_str) {
            Some(name) => ParamType::from_str(name).unwrap_or_else(|_| {
                warn!("Unknown parameter type '{}', using string", name);
                ParamType::String
            }),
            None => ParamType::String,
        };
        Self {
            param_type,
            required: block
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            default: block.get("default").filter(|v| !v.is_null()).cloned(),
            description: block
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut block = Properties::new();
        block.insert("type".into(), self.param_type.to_string().into());
        block.insert("required".into(), self.required.into());
        if let Some(default) = &self.default {
            block.insert("default".into(), default.clone());
        }
        if let Some(description) = &self.description {
            block.insert("description".into(), description.as_str().into());
        }
        Value::Map(block)
    }
}

#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub params: IndexMap<String, ParamSpec>,
    handler: ToolHandler,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Tool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        params: IndexMap<String, ParamSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(&Properties) -> ToolResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            params,
            handler: Arc::new(handler),
        }
    }

    /// Checks required parameters, fills declared defaults and invokes the
    /// handler. The caller's arguments are not modified.
    pub fn call(&self, args: &Properties) -> ToolResult<Value> {
        let mut args = args.clone();
        for (name, spec) in &self.params {
            if args.contains_key(name) {
                continue;
            }
            if spec.required {
                return Err(ToolError::MissingParameter(name.clone()));
            }
            if let Some(default) = &spec.default {
                args.insert(name.clone(), default.clone());
            }
        }
        (self.handler)(&args)
    }

    /// Function description offered to a completion provider.
    pub fn to_spec(&self) -> ToolSpec {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|(name, spec)| {
                let mut property = json!({ "type": spec.param_type.json_type() });
                if let Some(description) = &spec.description {
                    property["description"] = json!(description);
                }
                (name.clone(), property)
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
            .collect();
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        let params: Properties = self
            .params
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_value()))
            .collect();
        let mut value = Properties::new();
        value.insert("name".into(), self.name.as_str().into());
        value.insert("description".into(), self.description.as_str().into());
        value.insert("params".into(), Value::Map(params));
        Value::Map(value)
    }
}

/// Tools available in every runtime.
pub fn builtin_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "web_search",
            "Search the web",
            IndexMap::from([
                ("query".to_string(), ParamSpec::new(ParamType::String).required()),
                (
                    "max_results".to_string(),
                    ParamSpec::new(ParamType::Int).with_default(Value::Integer(5)),
                ),
            ]),
            web_search,
        ),
        Tool::new(
            "read_file",
            "Read a file",
            IndexMap::from([("path".to_string(), ParamSpec::new(ParamType::String).required())]),
            read_file,
        ),
        Tool::new(
            "write_file",
            "Write to a file",
            IndexMap::from([
                ("path".to_string(), ParamSpec::new(ParamType::String).required()),
                ("content".to_string(), ParamSpec::new(ParamType::String).required()),
            ]),
            write_file,
        ),
        Tool::new(
            "http_get",
            "HTTP GET request",
            IndexMap::from([("url".to_string(), ParamSpec::new(ParamType::String).required())]),
            http_get,
        ),
    ]
}

fn text_arg(args: &Properties, name: &str) -> ToolResult<String> {
    args.get(name)
        .map(Value::to_string)
        .ok_or_else(|| ToolError::MissingParameter(name.to_string()))
}

fn web_search(args: &Properties) -> ToolResult<Value> {
    let query = text_arg(args, "query")?;
    let max_results = args.get("max_results").and_then(Value::as_i64).unwrap_or(5);
    info!("web_search({}, max_results={})", query, max_results);
    Ok(format!("[MOCK] Search results for: {}", query).into())
}

fn read_file(args: &Properties) -> ToolResult<Value> {
    let path = text_arg(args, "path")?;
    std::fs::read_to_string(&path)
        .map(Value::String)
        .map_err(|e| ToolError::Handler(format!("Failed to read {}: {}", path, e)))
}

fn write_file(args: &Properties) -> ToolResult<Value> {
    let path = text_arg(args, "path")?;
    let content = text_arg(args, "content")?;
    if let Some(parent) = Path::new(&path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ToolError::Handler(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    std::fs::write(&path, &content)
        .map_err(|e| ToolError::Handler(format!("Failed to write {}: {}", path, e)))?;
    Ok(format!("Wrote {} bytes to {}", content.len(), path).into())
}

fn http_get(args: &Properties) -> ToolResult<Value> {
    let url = text_arg(args, "url")?;
    info!("http_get({})", url);
    Ok(format!("[MOCK] Response from {}", url).into())
}
