//! CLI configuration loader for askta
//!
//! Built once from parsed flags and passed to the command that needs a
//! config. Loading goes through [`ConfigStore`], then the flag overrides are
//! merged on top:
//! 1. --config file (when given)
//! 2. ~/.config/askta/config.yaml

use askta_core::config::resolve_path;
use askta_core::{merge, ConfigStore, Loaded, Overrides, SecretCodec};
use std::path::PathBuf;
use tracing::debug;

/// CLI configuration loader
#[derive(Debug, Clone, Default)]
pub struct CliConfigLoader {
    /// Override config file path
    config_override: Option<PathBuf>,
    /// Flag overrides
    overrides: Overrides,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file override; a leading `~` is expanded
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        self.config_override = Some(PathBuf::from(expanded));
        self
    }

    /// Set flag overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// The config path this loader will use
    pub fn config_path(&self) -> askta_core::Result<PathBuf> {
        resolve_path(self.config_override.clone().unwrap_or_default())
    }

    /// Load and resolve configuration
    ///
    /// A bootstrap is passed through untouched; overrides only apply to a
    /// usable config.
    pub fn load<C: SecretCodec>(&self, codec: C) -> askta_core::Result<Loaded> {
        let store = ConfigStore::at_path(self.config_path()?, codec);
        debug!(path = %store.path().display(), "Loading config");

        Ok(match store.load()? {
            Loaded::Ready(config) => {
                debug!(overrides = ?self.overrides, "Applying flag overrides");
                Loaded::Ready(merge(config, &self.overrides))
            }
            bootstrapped => bootstrapped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askta_core::MachineCodec;

    #[test]
    fn test_tilde_is_expanded() {
        let loader = CliConfigLoader::new().with_config_override(PathBuf::from("~/askta.yaml"));
        let path = loader.config_path().unwrap();

        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("askta.yaml"));
    }

    #[test]
    fn test_overrides_apply_after_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_key: sk-abc\nmodel_name: gpt-4o\n").unwrap();

        let loader = CliConfigLoader::new()
            .with_config_override(path)
            .with_overrides(Overrides::new().with_model("gpt-5").with_private_mode());
        let loaded = loader.load(MachineCodec::from_material(b"loader")).unwrap();

        match loaded {
            Loaded::Ready(config) => {
                assert_eq!(config.model_name, "gpt-5");
                assert_eq!(config.api_key, "sk-abc");
                assert!(config.private_mode);
            }
            Loaded::Bootstrapped { .. } => panic!("expected a ready config"),
        }
    }
}
