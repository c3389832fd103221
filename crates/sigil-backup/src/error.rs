//! Error taxonomy for `sigil-backup`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup file is corrupted: checksum mismatch")]
    BackupCorrupted,

    #[error("failed to decrypt backup: wrong password or corrupted ciphertext")]
    DecryptionFailed,

    #[error("a wallet named '{0}' already exists")]
    WalletExists(String),

    #[error("backup file not found: {0}")]
    NotFound(String),

    #[error("invalid backup format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    WalletStore(#[from] sigil_wallet_store::WalletStoreError),

    #[error("io error: {0}")]
    Io(String),
}

impl Diagnose for BackupError {
    fn kind(&self) -> ErrorKind {
        match self {
            BackupError::BackupCorrupted => ErrorKind::General,
            BackupError::DecryptionFailed => ErrorKind::DecryptionFailed,
            BackupError::WalletExists(_) => ErrorKind::WalletExists,
            BackupError::NotFound(_) => ErrorKind::NotFound,
            BackupError::InvalidFormat(_) => ErrorKind::General,
            BackupError::WalletStore(inner) => inner.kind(),
            BackupError::Io(_) => ErrorKind::General,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            BackupError::BackupCorrupted => {
                Some("the backup file has been modified or damaged; restore from another copy".to_string())
            }
            BackupError::DecryptionFailed => Some("double check the backup password".to_string()),
            _ => None,
        }
    }
}
