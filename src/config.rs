//! System configuration, loaded from JSON.
//!
//! Every field has a serde default, so `{}` is a valid configuration file.
//!
//! ```json
//! {
//!   "settings": { "default_model": "claude-3-5-sonnet-latest" },
//!   "providers": {
//!     "openai": { "base_url": "https://api.openai.com/v1" },
//!     "anthropic": { "api_version": "2023-06-01" }
//!   },
//!   "mock": false
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::value::{Properties, Value};
use crate::{Error, InternalResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemConfig {
    /// Seeds the runtime `config` map before any `config { ... }` block runs.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub providers: ProviderConfigs,

    /// Forces mock completions regardless of credentials.
    #[serde(default)]
    pub mock: bool,
}

impl SystemConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> InternalResult<Self> {
        from_file(path)
    }

    /// `settings` as runtime values, in file order.
    pub fn initial_settings(&self) -> Properties {
        self.settings
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfigs {
    #[serde(default)]
    pub openai: OpenAIProviderConfig,
    #[serde(default)]
    pub anthropic: AnthropicProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIProviderConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAIProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicProviderConfig {
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    #[serde(default = "default_anthropic_api_version")]
    pub api_version: String,
}

impl Default for AnthropicProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            api_version: default_anthropic_api_version(),
        }
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> InternalResult<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> InternalResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_api_version() -> String {
    "2023-06-01".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SystemConfig = from_str("{}").unwrap();
        assert!(!config.mock);
        assert!(config.settings.is_empty());
        assert_eq!(config.providers.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.providers.anthropic.api_version, "2023-06-01");
    }

    #[test]
    fn test_settings_keep_file_order() {
        let config: SystemConfig =
            from_str(r#"{"settings": {"zeta": 1, "alpha": "a"}, "mock": true}"#).unwrap();
        let settings = config.initial_settings();
        assert_eq!(settings.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(settings.get("alpha"), Some(&Value::from("a")));
        assert!(config.mock);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"providers": {{"anthropic": {{"base_url": "http://localhost:9000"}}}}}}"#
        )
        .unwrap();
        let config = SystemConfig::from_file(file.path()).unwrap();
        assert_eq!(config.providers.anthropic.base_url, "http://localhost:9000");
        assert_eq!(config.providers.anthropic.api_version, "2023-06-01");
    }

    #[test]
    fn test_invalid_config() {
        let result: InternalResult<SystemConfig> = from_str("{ not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
