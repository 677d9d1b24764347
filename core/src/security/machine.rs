//! Machine-bound secret codec
//!
//! The key is derived from material that identifies the local machine and
//! user, so ciphertext written here will not decrypt elsewhere.

use super::SecretCodec;
use crate::error::SecretError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::cell::OnceCell;
use std::fmt;
use tracing::debug;

/// Environment variable that replaces the machine material when set
pub const SEED_ENV_VAR: &str = "ASKTA_SECRET_SEED";

const KEY_CONTEXT: &[u8] = b"askta/api-key/v1";
const MACHINE_ID_PATH: &str = "/etc/machine-id";
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// ChaCha20-Poly1305 codec keyed from local machine material
#[derive(Clone)]
pub struct MachineCodec {
    key: [u8; 32],
}

impl MachineCodec {
    /// Derive the key for the current machine and user
    ///
    /// Uses `ASKTA_SECRET_SEED` when it is set and non-empty. Otherwise mixes
    /// the machine id (when readable), the home directory, and the user name.
    pub fn from_machine() -> Result<Self, SecretError> {
        if let Ok(seed) = std::env::var(SEED_ENV_VAR) {
            if !seed.is_empty() {
                debug!("Deriving secret key from {}", SEED_ENV_VAR);
                return Ok(Self::from_material(seed.as_bytes()));
            }
        }

        let mut parts: Vec<Vec<u8>> = Vec::new();
        if let Ok(id) = std::fs::read_to_string(MACHINE_ID_PATH) {
            let id = id.trim();
            if !id.is_empty() {
                parts.push(id.as_bytes().to_vec());
            }
        }
        if let Some(home) = dirs::home_dir() {
            parts.push(home.to_string_lossy().into_owned().into_bytes());
        }
        if let Some(user) = std::env::var("USER")
            .ok()
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|user| !user.is_empty())
        {
            parts.push(user.into_bytes());
        }

        if parts.is_empty() {
            return Err(SecretError::NoKeyMaterial);
        }

        debug!("Deriving secret key from {} machine source(s)", parts.len());
        let mut material = Vec::new();
        for part in parts {
            material.extend_from_slice(&(part.len() as u64).to_le_bytes());
            material.extend_from_slice(&part);
        }
        Ok(Self::from_material(&material))
    }

    /// Derive the key from explicit material
    pub fn from_material(material: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_CONTEXT);
        hasher.update([0u8]);
        hasher.update(material);
        let mut key = [0u8; 32];
        key.copy_from_slice(&hasher.finalize());
        Self { key }
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }
}

impl SecretCodec for MachineCodec {
    fn encrypt(&self, plaintext: &str) -> Result<String, SecretError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| SecretError::Encryption {
                message: e.to_string(),
            })?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(blob))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, SecretError> {
        let blob = URL_SAFE_NO_PAD
            .decode(ciphertext.trim())
            .map_err(|_| SecretError::Decryption {
                message: "ciphertext is not valid base64".to_string(),
            })?;

        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(SecretError::Decryption {
                message: "ciphertext is too short".to_string(),
            });
        }

        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let opened = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| SecretError::Decryption {
                message: "ciphertext is corrupted or was written on another machine".to_string(),
            })?;

        String::from_utf8(opened).map_err(|_| SecretError::Decryption {
            message: "decrypted key is not valid UTF-8".to_string(),
        })
    }
}

/// [`MachineCodec`] whose key is derived on first use
///
/// Loads that never reach the secret step (first-run bootstrap, validation
/// failures) do not need key material. When derivation fails, the error
/// surfaces from `encrypt` or `decrypt`.
#[derive(Debug, Default)]
pub struct LazyMachineCodec {
    codec: OnceCell<MachineCodec>,
}

impl LazyMachineCodec {
    pub fn new() -> Self {
        Self::default()
    }

    fn codec(&self) -> Result<&MachineCodec, SecretError> {
        if let Some(codec) = self.codec.get() {
            return Ok(codec);
        }
        let codec = MachineCodec::from_machine()?;
        Ok(self.codec.get_or_init(|| codec))
    }
}

impl SecretCodec for LazyMachineCodec {
    fn encrypt(&self, plaintext: &str) -> Result<String, SecretError> {
        self.codec()?.encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, SecretError> {
        self.codec()?.decrypt(ciphertext)
    }
}

impl fmt::Debug for MachineCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineCodec").finish_non_exhaustive()
    }
}
