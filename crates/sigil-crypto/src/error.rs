//! Error taxonomy for `sigil-crypto`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("decryption failed: authentication check did not pass")]
    DecryptionFailed,

    #[error("invalid key derivation parameters: {0}")]
    InvalidKdfParams(String),

    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("invalid share: {0}")]
    InvalidShare(String),

    #[error("shamir: threshold {k} exceeds share count {n}")]
    ThresholdExceedsShares { k: u8, n: u8 },

    #[error("shamir: threshold must be at least 2, got {0}")]
    ThresholdTooSmall(u8),

    #[error("shamir: secret too large ({len} bytes, max {max})")]
    SecretTooLarge { len: usize, max: usize },
}

impl Diagnose for CryptoError {
    fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::DecryptionFailed => ErrorKind::DecryptionFailed,
            CryptoError::InvalidKdfParams(_)
            | CryptoError::InvalidCiphertext(_)
            | CryptoError::InvalidShare(_)
            | CryptoError::ThresholdExceedsShares { .. }
            | CryptoError::ThresholdTooSmall(_)
            | CryptoError::SecretTooLarge { .. } => ErrorKind::InvalidInput,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CryptoError::DecryptionFailed => {
                Some("check the password and try again".to_string())
            }
            _ => None,
        }
    }
}
