//! RSA key pair loading and generation.
//!
//! Key material crosses the process boundary as Base64-encoded DER:
//! X.509 `SubjectPublicKeyInfo` for the public half and unencrypted PKCS#8
//! for the private half. Both forms are accepted by [`KeyPair::from_base64`]
//! and produced by [`KeyPair::public_key_base64`] /
//! [`KeyPair::private_key_base64`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Modulus size of generated keys, and the minimum accepted for loaded keys.
pub const KEY_BITS: usize = 2048;

/// An RSA public/private key pair.
///
/// The private key zeroizes its components when dropped.
#[derive(Clone)]
pub struct KeyPair {
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
}

impl KeyPair {
    /// Generates a fresh 2048-bit key pair from the OS CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, KEY_BITS)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        Ok(Self {
            public_key,
            private_key,
        })
    }

    /// Loads a key pair from Base64-encoded DER.
    ///
    /// # Arguments
    ///
    /// * `public_key` - Base64 of an X.509 `SubjectPublicKeyInfo` RSA key
    /// * `private_key` - Base64 of an unencrypted PKCS#8 RSA key
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if either blob is not Base64, is not
    /// an RSA key in the expected encoding, or has a modulus below 2048 bits.
    pub fn from_base64(public_key: &str, private_key: &str) -> Result<Self, CryptoError> {
        let public_der = decode_material("public", public_key)?;
        let public_key = RsaPublicKey::from_public_key_der(&public_der)
            .map_err(|e| CryptoError::InvalidKey(format!("public key: {e}")))?;
        check_size("public", public_key.size())?;

        let private_der = decode_material("private", private_key)?;
        let private_key = RsaPrivateKey::from_pkcs8_der(&private_der)
            .map_err(|e| CryptoError::InvalidKey(format!("private key: {e}")))?;
        check_size("private", private_key.size())?;

        Ok(Self {
            public_key,
            private_key,
        })
    }

    /// Returns the public half.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Returns the private half.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Modulus size of the public key in bits.
    pub fn bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// Encodes the public key as Base64 `SubjectPublicKeyInfo` DER.
    pub fn public_key_base64(&self) -> Result<String, CryptoError> {
        let der = self
            .public_key
            .to_public_key_der()
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(BASE64.encode(der.as_bytes()))
    }

    /// Encodes the private key as Base64 PKCS#8 DER.
    ///
    /// The returned string is zeroized when dropped.
    pub fn private_key_base64(&self) -> Result<Zeroizing<String>, CryptoError> {
        let der = self
            .private_key
            .to_pkcs8_der()
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Zeroizing::new(BASE64.encode(der.as_bytes())))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

fn decode_material(which: &str, material: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    BASE64
        .decode(material.trim())
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::InvalidKey(format!("{which} key is not valid base64: {e}")))
}

fn check_size(which: &str, modulus_bytes: usize) -> Result<(), CryptoError> {
    let bits = modulus_bytes * 8;
    if bits < KEY_BITS {
        return Err(CryptoError::InvalidKey(format!(
            "{which} key is {bits} bits, at least {KEY_BITS} required"
        )));
    }
    Ok(())
}
