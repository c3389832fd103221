//! Authenticated encryption, password-based key derivation, secret
//! zeroization, and Shamir secret sharing for the Sigil wallet core.

pub mod aead;
pub mod error;
pub mod kdf;
pub mod shamir;
pub mod zeroize_ext;

pub use aead::{open, seal, Sealed, NONCE_LEN, TAG_LEN};
pub use error::CryptoError;
pub use kdf::{derive_key, generate_salt, use_fast_params_for_tests, KdfParams, KEY_LEN, SALT_LEN};
pub use shamir::{combine, split, MAX_SECRET_LEN};
pub use zeroize_ext::{zeroize, Secret};
