//! # askta Core
//!
//! Configuration and credential handling for askta, an AI assistant for the
//! terminal.
//!
//! The config file is discovered (or created on first run), parsed, and
//! validated here. The API key it holds is encrypted at rest on the first
//! load and decrypted in memory on every later one.

pub mod config;
pub mod error;
pub mod security;

// Re-export commonly used types
pub use config::{merge, Config, ConfigStore, Loaded, Overrides, PrivateModeOverride};
pub use error::{Error, Result, SecretError, ValidationError};
pub use security::{LazyMachineCodec, MachineCodec, SecretCodec};

/// Current version of the askta-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
