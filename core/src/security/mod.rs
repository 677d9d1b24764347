//! Secret protection for credentials stored in the config file

pub mod machine;

pub use machine::{LazyMachineCodec, MachineCodec};

use crate::error::SecretError;

/// Encrypts and decrypts short secrets such as API keys
///
/// Implementations must satisfy `decrypt(encrypt(x)) == x` for every `x`
/// that `encrypt` accepts. Ciphertext is not required to be portable between
/// machines; a foreign ciphertext must fail with [`SecretError::Decryption`].
pub trait SecretCodec {
    /// Protect a plaintext secret, returning a text-safe ciphertext
    fn encrypt(&self, plaintext: &str) -> Result<String, SecretError>;

    /// Recover the plaintext from a ciphertext produced by `encrypt`
    fn decrypt(&self, ciphertext: &str) -> Result<String, SecretError>;
}
