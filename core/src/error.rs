//! Error types and handling for askta core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for askta core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for askta core
///
/// Every variant is fatal to a config load. None of the messages include the
/// value of `api_key` or any other raw config content.
#[derive(Error, Debug)]
pub enum Error {
    /// Directory creation, read, or write failures
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No explicit config path and no home directory to fall back to
    #[error("Could not determine the home directory; pass --config explicitly")]
    HomeDirUnavailable,

    /// Malformed YAML document
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Config could not be rendered back to YAML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// Required field missing or unusable
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// Stored ciphertext cannot be decrypted in the current context
    #[error(
        "Failed to decrypt api_key in {path}: {source}. \
         Replace the api_key value with your plaintext API key; \
         it will be encrypted again on the next run"
    )]
    Decrypt {
        path: PathBuf,
        #[source]
        source: SecretError,
    },

    /// Plaintext key could not be protected
    #[error("Failed to encrypt api_key: {0}")]
    Encrypt(#[source] SecretError),
}

/// Validation failures found after parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field '{field}' in {path}")]
    MissingField { field: &'static str, path: PathBuf },

    #[error("Field '{field}' in {path} still holds the default placeholder; add your API key")]
    Placeholder { field: &'static str, path: PathBuf },
}

/// Secret codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("no key derivation material available on this machine")]
    NoKeyMaterial,

    #[error("encryption failed: {message}")]
    Encryption { message: String },

    #[error("decryption failed: {message}")]
    Decryption { message: String },
}

impl Error {
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
