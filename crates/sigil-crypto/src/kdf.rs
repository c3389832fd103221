//! Password-based key derivation (Argon2id).
//!
//! Tuned for roughly 100-500ms on contemporary hardware by default. Test
//! suites that would otherwise spend minutes deriving keys can call
//! [`use_fast_params_for_tests`] once, process-wide, to drop to a
//! low-cost profile; production code paths never call it.

use std::sync::atomic::{AtomicBool, Ordering};

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::error::CryptoError;

pub const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 32;

static FAST_KDF: AtomicBool = AtomicBool::new(false);

/// Switches every subsequent [`KdfParams::default`] call in this process to
/// a deliberately weak profile. Intended for test setup only.
pub fn use_fast_params_for_tests() {
    FAST_KDF.store(true, Ordering::SeqCst);
}

/// Argon2id tuning knobs, persisted alongside the ciphertext so a future
/// reader can reproduce the same derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    pub algorithm: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        if FAST_KDF.load(Ordering::SeqCst) {
            KdfParams {
                algorithm: "argon2id".to_string(),
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            }
        } else {
            KdfParams {
                algorithm: "argon2id".to_string(),
                memory_kib: 64 * 1024,
                iterations: 3,
                parallelism: 4,
            }
        }
    }
}

/// Generates a fresh random salt of [`SALT_LEN`] bytes.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Derives a 32-byte key from `password` and `salt` under `params`.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN], CryptoError> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CryptoError::InvalidKdfParams(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
    let mut out = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| CryptoError::InvalidKdfParams(e.to_string()))?;
    Ok(out)
}
