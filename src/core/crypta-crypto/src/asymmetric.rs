//! RSA encryption of short strings.
//!
//! Plaintext is encrypted as a single RSA block with PKCS#1 v1.5 encryption
//! padding, the transform behind the JCE `"RSA"` default. Ciphertext is the
//! raw block encoded as standard padded Base64.
//!
//! The construction is unauthenticated. It is kept for compatibility with
//! ciphertexts that are already stored, not because it is a good choice.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Encrypt;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::KeyPair;

/// Bytes of each block consumed by PKCS#1 v1.5 encryption padding.
pub const PKCS1_OVERHEAD: usize = 11;

/// String encryption with a public/private key pair.
pub trait AsymmetricCipher: Send + Sync {
    /// Encrypts `plaintext` and returns the Base64 ciphertext.
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;

    /// Decrypts a Base64 ciphertext produced by [`AsymmetricCipher::encrypt`].
    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError>;

    /// Largest plaintext, in UTF-8 bytes, that fits in one block.
    fn max_plaintext_len(&self) -> usize;
}

/// RSA cipher bound to one key pair for the life of the process.
#[derive(Debug)]
pub struct RsaCipher {
    keys: KeyPair,
}

impl RsaCipher {
    /// Creates a cipher from a loaded or generated key pair.
    pub fn new(keys: KeyPair) -> Self {
        Self { keys }
    }

    /// Loads the key pair from Base64 DER and creates a cipher.
    ///
    /// See [`KeyPair::from_base64`] for the accepted formats.
    pub fn from_base64(public_key: &str, private_key: &str) -> Result<Self, CryptoError> {
        let keys = KeyPair::from_base64(public_key, private_key)?;
        debug!(bits = keys.bits(), "RSA key pair loaded");
        Ok(Self::new(keys))
    }

    /// Returns the key pair.
    pub fn key_pair(&self) -> &KeyPair {
        &self.keys
    }

    fn block_len(&self) -> usize {
        self.keys.public_key().size()
    }
}

impl AsymmetricCipher for RsaCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let bytes = plaintext.as_bytes();
        let limit = self.max_plaintext_len();
        if bytes.len() > limit {
            return Err(CryptoError::EncryptionFailed(format!(
                "plaintext is {} bytes, limit is {} for a {}-bit key",
                bytes.len(),
                limit,
                self.keys.bits()
            )));
        }

        let block = self
            .keys
            .public_key()
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, bytes)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(BASE64.encode(block))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let block = BASE64.decode(ciphertext).map_err(|e| {
            CryptoError::DecryptionFailed(format!("ciphertext is not valid base64: {e}"))
        })?;

        let expected = self.block_len();
        if block.len() != expected {
            return Err(CryptoError::DecryptionFailed(format!(
                "ciphertext block is {} bytes, expected {}",
                block.len(),
                expected
            )));
        }

        let plaintext = Zeroizing::new(
            self.keys
                .private_key()
                .decrypt_blinded(&mut OsRng, Pkcs1v15Encrypt, &block)
                .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?,
        );

        std::str::from_utf8(&plaintext)
            .map(str::to_owned)
            .map_err(|_| CryptoError::DecryptionFailed("plaintext is not valid UTF-8".into()))
    }

    fn max_plaintext_len(&self) -> usize {
        self.block_len() - PKCS1_OVERHEAD
    }
}
