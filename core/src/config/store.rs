//! Config file discovery, first-run bootstrap, and credential migration
//!
//! A load runs through a fixed sequence: a missing file is replaced with the
//! default template and reported as [`Loaded::Bootstrapped`]. An existing file
//! is parsed and validated, then its `api_key` is resolved. Ciphertext is
//! decrypted in memory. Plaintext is encrypted and written back once, while
//! the caller still receives the plaintext.

use super::template::DEFAULT_CONFIG_YAML;
use super::types::{Config, API_KEY_PLACEHOLDER, DEFAULT_MODEL, ENCRYPTED_PREFIX};
use crate::error::{Error, Result, ValidationError};
use crate::security::SecretCodec;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use super::template::{CONFIG_DIR_MODE, CONFIG_FILE_MODE};

/// Location of the config file relative to the home directory
pub const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".config/askta/config.yaml";

/// Outcome of a successful load
#[derive(Debug)]
pub enum Loaded {
    /// A usable configuration with a plaintext `api_key`
    Ready(Config),
    /// No file existed; the default template was written to `path`.
    /// The user has to edit it before the assistant can be used.
    Bootstrapped { path: PathBuf },
}

/// Resolve the config path for an invocation
///
/// A non-empty `explicit` path is used verbatim. Otherwise the file lives at
/// `~/.config/askta/config.yaml`.
pub fn resolve_path(explicit: impl AsRef<Path>) -> Result<PathBuf> {
    let explicit = explicit.as_ref();
    if !explicit.as_os_str().is_empty() {
        return Ok(explicit.to_path_buf());
    }

    let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
    Ok(home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

/// Reads and normalizes the config file at a single path
#[derive(Debug, Clone)]
pub struct ConfigStore<C> {
    path: PathBuf,
    codec: C,
}

impl<C: SecretCodec> ConfigStore<C> {
    /// Create a store for an already resolved path
    pub fn at_path(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default template to the store's path
    ///
    /// Creates missing parent directories. An existing file is overwritten,
    /// so callers check for it first; [`ConfigStore::load`] does.
    pub fn bootstrap(&self) -> Result<Loaded> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(|e| Error::io("create config directory", dir, e))?;
        }

        replace_private_file(&self.path, DEFAULT_CONFIG_YAML.as_bytes())
            .map_err(|e| Error::io("write default config", &self.path, e))?;

        debug!(path = %self.path.display(), "Wrote default config");
        Ok(Loaded::Bootstrapped {
            path: self.path.clone(),
        })
    }

    /// Load the config, bootstrapping or migrating the file as needed
    pub fn load(&self) -> Result<Loaded> {
        let path = &self.path;
        let exists = path
            .try_exists()
            .map_err(|e| Error::io("access config file", path, e))?;
        if !exists {
            return self.bootstrap();
        }

        let document =
            fs::read_to_string(path).map_err(|e| Error::io("read config file", path, e))?;
        let parsed = parse_document(path, &document)?;

        let mut config = parsed.clone();
        validate(path, &mut config)?;

        if let Some(ciphertext) = config.api_key.strip_prefix(ENCRYPTED_PREFIX) {
            let plaintext = self
                .codec
                .decrypt(ciphertext)
                .map_err(|source| Error::Decrypt {
                    path: path.clone(),
                    source,
                })?;
            config.api_key = plaintext;
            debug!(path = %path.display(), "Decrypted stored API key");
        } else {
            let ciphertext = self.codec.encrypt(&config.api_key).map_err(Error::Encrypt)?;
            let sealed = format!("{}{}", ENCRYPTED_PREFIX, ciphertext);

            let updated = match rewrite_api_key(&document, &parsed, &sealed) {
                Some(updated) => updated,
                None => {
                    debug!(path = %path.display(), "Re-serializing config to store encrypted key");
                    let stored = Config {
                        api_key: sealed,
                        ..parsed.clone()
                    };
                    serde_yaml::to_string(&stored).map_err(Error::Serialize)?
                }
            };

            replace_private_file(path, updated.as_bytes())
                .map_err(|e| Error::io("write config file", path, e))?;
            debug!(path = %path.display(), "Encrypted plaintext API key at rest");
        }

        Ok(Loaded::Ready(config))
    }
}

fn parse_document(path: &Path, document: &str) -> Result<Config> {
    let blank = document.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(Config::default());
    }

    serde_yaml::from_str(document).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reject unusable keys and fill in the model default
///
/// The untouched bootstrap placeholder is rejected here rather than being
/// encrypted and sent to the provider.
fn validate(path: &Path, config: &mut Config) -> Result<()> {
    if config.api_key.is_empty() {
        return Err(ValidationError::MissingField {
            field: "api_key",
            path: path.to_path_buf(),
        }
        .into());
    }
    if config.api_key == API_KEY_PLACEHOLDER {
        return Err(ValidationError::Placeholder {
            field: "api_key",
            path: path.to_path_buf(),
        }
        .into());
    }

    if config.model_name.is_empty() {
        config.model_name = DEFAULT_MODEL.to_string();
    }
    Ok(())
}

/// Replace the value on the top-level `api_key:` line, keeping everything else
///
/// Returns `None` when the line is missing or cannot be edited safely, or when
/// the edited document no longer parses to the same config.
fn rewrite_api_key(document: &str, parsed: &Config, sealed: &str) -> Option<String> {
    let mut updated = String::with_capacity(document.len() + sealed.len());
    let mut replaced = false;

    for line in document.split_inclusive('\n') {
        if !replaced {
            if let Some(rest) = line.strip_prefix("api_key:") {
                let body = rest.trim_end_matches(['\r', '\n']);
                let ending = &rest[body.len()..];
                let trailer = scalar_trailer(body)?;

                updated.push_str("api_key: \"");
                updated.push_str(sealed);
                updated.push('"');
                updated.push_str(trailer);
                updated.push_str(ending);
                replaced = true;
                continue;
            }
        }
        updated.push_str(line);
    }

    if !replaced {
        return None;
    }

    let expected = Config {
        api_key: sealed.to_string(),
        ..parsed.clone()
    };
    match serde_yaml::from_str::<Config>(&updated) {
        Ok(reparsed) if reparsed == expected => Some(updated),
        _ => None,
    }
}

/// The part of a `key: value` line after the scalar value (spacing + comment)
fn scalar_trailer(body: &str) -> Option<&str> {
    let value = body.trim_start();
    let start = body.len() - value.len();

    let end = if let Some(inner) = value.strip_prefix('"') {
        let mut escaped = false;
        let close = inner.char_indices().find_map(|(i, c)| {
            if escaped {
                escaped = false;
                None
            } else if c == '\\' {
                escaped = true;
                None
            } else if c == '"' {
                Some(i)
            } else {
                None
            }
        })?;
        close + 2
    } else if let Some(inner) = value.strip_prefix('\'') {
        let bytes = inner.as_bytes();
        let mut i = 0;
        loop {
            match bytes.get(i) {
                Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                Some(b'\'') => break i + 2,
                Some(_) => i += 1,
                None => return None,
            }
        }
    } else if value.starts_with(['|', '>', '[', '{', '&', '*', '!']) {
        return None;
    } else {
        [value.find(" #"), value.find("\t#")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(value.len())
    };

    Some(&body[start + end..])
}

fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(CONFIG_DIR_MODE);
    }
    builder.create(dir)
}

/// Write `contents` to a sibling temp file, then rename it over `path`
///
/// A failed write leaves the existing file at `path` untouched.
fn replace_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = write_private_file(&tmp, contents).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CONFIG_FILE_MODE);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(CONFIG_FILE_MODE))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}
