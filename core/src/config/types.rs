//! Configuration types for askta
//!
//! `Config` mirrors the on-disk YAML document key for key. Every key is
//! optional in the document and falls back to its zero value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used when the document leaves `model_name` empty
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Prefix that marks an `api_key` value as ciphertext
pub const ENCRYPTED_PREFIX: &str = "encry_";

/// Value written by the bootstrap template in place of a real key
pub const API_KEY_PLACEHOLDER: &str = "your-api-key";

/// A fully resolved configuration for one run of the assistant
///
/// `api_key` is always plaintext in memory. Its `Debug` output is redacted.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base URL; empty means "let the provider decide"
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model_name: String,
    /// Do not send directory structure to the model
    pub private_mode: bool,
    /// Custom system prompt
    pub sys_prompt: String,
    /// AI provider type
    pub provider: String,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Proxy URL for provider requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .field("model_name", &self.model_name)
            .field("private_mode", &self.private_mode)
            .field("sys_prompt", &self.sys_prompt)
            .field("provider", &self.provider)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("proxy", &self.proxy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: "sk-very-secret".to_string(),
            ..Config::default()
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_missing_keys_use_zero_values() {
        let config: Config = serde_yaml::from_str("api_key: abc\n").unwrap();

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.model_name, "");
        assert!(!config.private_mode);
        assert_eq!(config.temperature, None);
    }

    #[test]
    fn test_optional_fields_are_not_serialized_when_unset() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();

        assert!(yaml.contains("api_key"));
        assert!(!yaml.contains("temperature"));
        assert!(!yaml.contains("proxy"));
    }
}
