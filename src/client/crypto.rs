//! Record payload encryption
//!
//! Payloads are encrypted with AES-256-GCM. Keys are derived from the password
//! with PBKDF2-HMAC-SHA256 over a random salt. A cipher draws one salt when it
//! is created and a fresh nonce per payload. The ciphertext is stored as base64
//! text of `salt || nonce || ciphertext`, so encrypted records stay printable
//! and any cipher holding the password can decrypt them.

use crate::error::DisError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::Mutex;
use zeroize::Zeroizing;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// PBKDF2 rounds per derived key
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derived keys kept for salts seen while decrypting
const KEY_CACHE_LIMIT: usize = 64;

/// Encrypts record payloads before upload and decrypts them after download
pub trait PayloadCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, DisError>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DisError>;
}

/// Password-based AES-256-GCM cipher
pub struct AesGcmCipher {
    password: SecretString,
    salt: [u8; SALT_LEN],
    keys: Mutex<HashMap<[u8; SALT_LEN], Aes256Gcm>>,
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

fn derive_key(password: &SecretString, salt: &[u8]) -> Aes256Gcm {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        &mut key[..],
    );
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]))
}

impl AesGcmCipher {
    /// Create a cipher
    ///
    /// Derives the encryption key up front, which takes a noticeable amount of CPU.
    ///
    /// # Errors
    ///
    /// Returns `EncryptionError` if the password is empty.
    pub fn new(password: SecretString) -> Result<Self, DisError> {
        if password.expose_secret().is_empty() {
            return Err(DisError::EncryptionError(
                "data password can not be empty".to_string(),
            ));
        }

        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let key = derive_key(&password, &salt);

        Ok(Self {
            password,
            salt,
            keys: Mutex::new(HashMap::from([(salt, key)])),
        })
    }

    fn cipher_for(&self, salt: &[u8]) -> Result<Aes256Gcm, DisError> {
        let salt: [u8; SALT_LEN] = salt
            .try_into()
            .map_err(|_| DisError::EncryptionError(format!("salt must be {} bytes", SALT_LEN)))?;

        let mut keys = self
            .keys
            .lock()
            .map_err(|_| DisError::EncryptionError("key cache lock poisoned".to_string()))?;
        if let Some(cipher) = keys.get(&salt) {
            return Ok(cipher.clone());
        }

        if keys.len() >= KEY_CACHE_LIMIT {
            keys.retain(|cached, _| *cached == self.salt);
        }
        let cipher = derive_key(&self.password, &salt);
        keys.insert(salt, cipher.clone());
        Ok(cipher)
    }
}

impl PayloadCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, DisError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher_for(&self.salt)?
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| DisError::EncryptionError(format!("Failed to encrypt payload: {}", e)))?;

        let mut framed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&self.salt);
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(framed).into_bytes())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DisError> {
        let framed = STANDARD.decode(ciphertext).map_err(|e| {
            DisError::EncryptionError(format!("Encrypted payload is not base64: {}", e))
        })?;
        if framed.len() < SALT_LEN + NONCE_LEN {
            return Err(DisError::EncryptionError(format!(
                "Encrypted payload too short: {} bytes",
                framed.len()
            )));
        }

        let (salt, rest) = framed.split_at(SALT_LEN);
        let (nonce, body) = rest.split_at(NONCE_LEN);
        self.cipher_for(salt)?
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|e| DisError::EncryptionError(format!("Failed to decrypt payload: {}", e)))
    }
}
