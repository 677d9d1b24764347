//! Per-invocation overrides applied on top of a loaded config

use super::types::Config;
use std::fmt;

/// Private mode can only be switched on from the command line, never off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrivateModeOverride {
    #[default]
    Unset,
    ForceTrue,
}

/// Field replacements requested for a single invocation
///
/// `None` and empty strings leave the loaded value in place.
#[derive(Clone, Default, PartialEq)]
pub struct Overrides {
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub sys_prompt: Option<String>,
    pub provider: Option<String>,
    pub proxy: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub private_mode: PrivateModeOverride,
}

impl Overrides {
    /// Create an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a string map keyed the way the command line names flags
    ///
    /// Recognized keys: `model`, `url`, `key`, `sys_prompt`, `provider`,
    /// `proxy`, `temperature`, `max_tokens`, `private_mode`. The presence of
    /// `private_mode` forces private mode on whatever its value. Numeric
    /// values that do not parse are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::new();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "model" => overrides.model_name = Some(value),
                "url" => overrides.base_url = Some(value),
                "key" => overrides.api_key = Some(value),
                "sys_prompt" => overrides.sys_prompt = Some(value),
                "provider" => overrides.provider = Some(value),
                "proxy" => overrides.proxy = Some(value),
                "temperature" => overrides.temperature = value.trim().parse().ok(),
                "max_tokens" => overrides.max_tokens = value.trim().parse().ok(),
                "private_mode" => overrides.private_mode = PrivateModeOverride::ForceTrue,
                _ => {}
            }
        }
        overrides
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_sys_prompt(mut self, sys_prompt: impl Into<String>) -> Self {
        self.sys_prompt = Some(sys_prompt.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_private_mode(mut self) -> Self {
        self.private_mode = PrivateModeOverride::ForceTrue;
        self
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("sys_prompt", &self.sys_prompt)
            .field("provider", &self.provider)
            .field("proxy", &self.proxy)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("private_mode", &self.private_mode)
            .finish()
    }
}

/// Apply `overrides` to `config`
///
/// Total and pure; nothing is re-validated afterwards.
pub fn merge(mut config: Config, overrides: &Overrides) -> Config {
    replace_if_set(&mut config.model_name, &overrides.model_name);
    replace_if_set(&mut config.base_url, &overrides.base_url);
    replace_if_set(&mut config.api_key, &overrides.api_key);
    replace_if_set(&mut config.sys_prompt, &overrides.sys_prompt);
    replace_if_set(&mut config.provider, &overrides.provider);

    if let Some(proxy) = overrides.proxy.as_deref().filter(|p| !p.is_empty()) {
        config.proxy = Some(proxy.to_string());
    }
    if overrides.temperature.is_some() {
        config.temperature = overrides.temperature;
    }
    if overrides.max_tokens.is_some() {
        config.max_tokens = overrides.max_tokens;
    }
    if overrides.private_mode == PrivateModeOverride::ForceTrue {
        config.private_mode = true;
    }

    config
}

fn replace_if_set(field: &mut String, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        *field = value.to_string();
    }
}
