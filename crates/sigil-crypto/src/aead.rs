//! Authenticated encryption (AES-256-GCM).
//!
//! `seal` returns the nonce alongside a ciphertext with the GCM tag
//! appended, the standard AEAD convention; callers that need the tag as a
//! separate on-disk field (the wallet file's `mac`) split the last
//! [`TAG_LEN`] bytes off themselves.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use crate::error::CryptoError;
use crate::kdf::KEY_LEN;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

fn cipher_for(key: &[u8; KEY_LEN]) -> Aes256Gcm {
    Aes256Gcm::new_from_slice(key).expect("32-byte key always accepted by AES-256-GCM")
}

/// Encrypts `plaintext` under `key`, authenticating `aad` as associated
/// data without encrypting it.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8], aad: &[u8]) -> Result<Sealed, CryptoError> {
    let cipher = cipher_for(key);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::InvalidCiphertext("encryption failure".to_string()))?;
    Ok(Sealed {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts a ciphertext produced by [`seal`]. Any tampering with
/// `ciphertext`, `nonce`, or `aad` is detected before any plaintext bytes
/// are released, surfacing as [`CryptoError::DecryptionFailed`].
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(key);
    let nonce = Nonce::from_slice(nonce);
    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = [3u8; KEY_LEN];
        let sealed = seal(&key, b"the quick brown fox", b"wallet:main").unwrap();
        let opened = open(&key, &sealed.nonce, &sealed.ciphertext, b"wallet:main").unwrap();
        assert_eq!(opened, b"the quick brown fox");
    }

    #[test]
    fn wrong_key_fails() {
        let key = [3u8; KEY_LEN];
        let other = [4u8; KEY_LEN];
        let sealed = seal(&key, b"secret", b"").unwrap();
        let result = open(&other, &sealed.nonce, &sealed.ciphertext, b"");
        assert_eq!(result, Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [5u8; KEY_LEN];
        let mut sealed = seal(&key, b"secret", b"").unwrap();
        let last = sealed.ciphertext.len() - 1;
        sealed.ciphertext[last] ^= 0xFF;
        let result = open(&key, &sealed.nonce, &sealed.ciphertext, b"");
        assert_eq!(result, Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn wrong_aad_fails() {
        let key = [6u8; KEY_LEN];
        let sealed = seal(&key, b"secret", b"context-a").unwrap();
        let result = open(&key, &sealed.nonce, &sealed.ciphertext, b"context-b");
        assert_eq!(result, Err(CryptoError::DecryptionFailed));
    }
}
