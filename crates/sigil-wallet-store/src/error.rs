//! Error taxonomy for `sigil-wallet-store`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletStoreError {
    #[error("wallet already exists: {0}")]
    WalletExists(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    #[error("invalid wallet name: {0}")]
    InvalidName(String),

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid wallet file format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl Diagnose for WalletStoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            WalletStoreError::WalletExists(_) => ErrorKind::WalletExists,
            WalletStoreError::WalletNotFound(_) => ErrorKind::WalletNotFound,
            WalletStoreError::InvalidName(_) => ErrorKind::InvalidInput,
            WalletStoreError::DecryptionFailed => ErrorKind::DecryptionFailed,
            WalletStoreError::InvalidFormat(_) => ErrorKind::General,
            WalletStoreError::Io(_) => ErrorKind::General,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            WalletStoreError::WalletExists(name) => {
                Some(format!("choose a different name, or delete \"{name}\" first"))
            }
            WalletStoreError::WalletNotFound(_) => Some("run list to see available wallets".to_string()),
            WalletStoreError::DecryptionFailed => Some("check the password and try again".to_string()),
            _ => None,
        }
    }
}
