//! Authenticated symmetric encryption and digests.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::EncryptionConfig;

/// 96-bit nonce, generated fresh per encryption.
const NONCE_LEN: usize = 12;
/// 128-bit authentication tag appended by AES-GCM.
const TAG_LEN: usize = 16;

/// Errors from the encryption service.
///
/// The decryption variant carries a fixed message regardless of root
/// cause (hex decode, truncation, tag mismatch, wrong key), so callers
/// cannot be used as a decryption oracle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// No key is configured. Fatal to the operation, not the process.
    #[error("encryption key is not configured")]
    Configuration,

    /// The underlying cipher failed to encrypt.
    #[error("encryption failed")]
    Encryption,

    /// Decryption failed. Deliberately uniform.
    #[error("invalid or corrupted ciphertext")]
    Decryption,
}

/// Authenticated encryption with a process-lifetime key.
///
/// The key is parsed once at construction; a missing or malformed key
/// leaves the service in a degraded state where every cryptographic
/// call returns [`CryptoError::Configuration`].
pub struct EncryptionService {
    key: Option<Key<Aes256Gcm>>,
}

impl EncryptionService {
    /// Build the service from configuration.
    pub fn from_config(config: &EncryptionConfig) -> Self {
        let trimmed = config.key_hex.trim();
        if trimmed.is_empty() {
            tracing::warn!("No encryption key configured; cryptographic operations will fail");
            return Self { key: None };
        }

        match hex::decode(trimmed) {
            Ok(bytes) if bytes.len() == 32 => Self {
                key: Some(*Key::<Aes256Gcm>::from_slice(&bytes)),
            },
            Ok(bytes) => {
                tracing::error!(
                    key_len = bytes.len(),
                    "Encryption key must be 32 bytes; cryptographic operations will fail"
                );
                Self { key: None }
            }
            Err(_) => {
                tracing::error!(
                    "Encryption key is not valid hex; cryptographic operations will fail"
                );
                Self { key: None }
            }
        }
    }

    /// Build the service from raw key bytes.
    pub fn new(key_bytes: [u8; 32]) -> Self {
        Self {
            key: Some(*Key::<Aes256Gcm>::from_slice(&key_bytes)),
        }
    }

    fn key(&self) -> Result<&Key<Aes256Gcm>, CryptoError> {
        self.key.as_ref().ok_or(CryptoError::Configuration)
    }

    /// Encrypt a payload under the configured key.
    ///
    /// Output is lowercase hex of `nonce ‖ ciphertext ‖ tag`, a single
    /// opaque string safe to embed in URLs.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let key = self.key()?;
        let cipher = Aes256Gcm::new(key);

        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Encryption)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(hex::encode(blob))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// All failure paths collapse into [`CryptoError::Decryption`].
    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, CryptoError> {
        let key = self.key()?;

        let blob = hex::decode(encoded.trim()).map_err(|_| CryptoError::Decryption)?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Decryption);
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(key);
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::Decryption)
    }

    /// One-way SHA-256 digest, hex-encoded. Integrity checks only, not
    /// secrecy.
    pub fn hash(&self, data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EncryptionService {
        EncryptionService::new([7u8; 32])
    }

    #[test]
    fn test_round_trip() {
        let svc = service();
        let cases: &[&[u8]] = &[b"", b"a", b"hello world", &[0u8; 257]];
        for plaintext in cases {
            let encrypted = svc.encrypt(plaintext).unwrap();
            let decrypted = svc.decrypt(&encrypted).unwrap();
            assert_eq!(&decrypted, plaintext);
        }
    }

    #[test]
    fn test_nonce_varies_per_call() {
        let svc = service();
        let a = svc.encrypt(b"same input").unwrap();
        let b = svc.encrypt(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tamper_detection_every_byte() {
        let svc = service();
        let encrypted = svc.encrypt(b"sensitive payload").unwrap();
        let blob = hex::decode(&encrypted).unwrap();

        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            let result = svc.decrypt(&hex::encode(tampered));
            assert_eq!(result, Err(CryptoError::Decryption), "byte {} flipped", i);
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let encrypted = EncryptionService::new([1u8; 32])
            .encrypt(b"for another key")
            .unwrap();
        let result = EncryptionService::new([2u8; 32]).decrypt(&encrypted);
        assert_eq!(result, Err(CryptoError::Decryption));
    }

    #[test]
    fn test_truncated_and_garbage_inputs() {
        let svc = service();
        assert_eq!(svc.decrypt(""), Err(CryptoError::Decryption));
        assert_eq!(svc.decrypt("zz-not-hex"), Err(CryptoError::Decryption));
        assert_eq!(svc.decrypt("aabbcc"), Err(CryptoError::Decryption));
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let svc = EncryptionService::from_config(&EncryptionConfig {
            key_hex: String::new(),
        });
        assert_eq!(svc.encrypt(b"x"), Err(CryptoError::Configuration));
        assert_eq!(svc.decrypt("00"), Err(CryptoError::Configuration));
    }

    #[test]
    fn test_from_config_parses_hex_key() {
        let svc = EncryptionService::from_config(&EncryptionConfig {
            key_hex: "ab".repeat(32),
        });
        let encrypted = svc.encrypt(b"configured").unwrap();
        assert_eq!(svc.decrypt(&encrypted).unwrap(), b"configured");
    }

    #[test]
    fn test_hash_known_vector() {
        let svc = service();
        assert_eq!(
            svc.hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
