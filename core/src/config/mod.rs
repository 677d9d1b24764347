//! Configuration loading for askta
//!
//! [`ConfigStore`] owns the on-disk document and the secret migration;
//! [`merge`] layers per-invocation overrides on the result.

pub mod overrides;
pub mod store;
pub mod template;
pub mod types;

pub use overrides::{merge, Overrides, PrivateModeOverride};
pub use store::{resolve_path, ConfigStore, Loaded, DEFAULT_CONFIG_RELATIVE_PATH};
pub use template::DEFAULT_CONFIG_YAML;
pub use types::{Config, API_KEY_PLACEHOLDER, DEFAULT_MODEL, ENCRYPTED_PREFIX};
