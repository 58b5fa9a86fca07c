//! # Crypta Crypto
//!
//! Asymmetric cipher service for Crypta.
//!
//! This crate provides:
//! - RSA key pair loading from Base64 DER (SPKI / PKCS#8)
//! - 2048-bit key pair generation
//! - String encryption/decryption with Base64 ciphertexts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod asymmetric;
pub mod error;
pub mod keys;

pub use asymmetric::{AsymmetricCipher, RsaCipher};
pub use error::CryptoError;
pub use keys::KeyPair;
