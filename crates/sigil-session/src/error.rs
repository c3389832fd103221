//! Error taxonomy for `sigil-session`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no OS keyring is reachable")]
    KeyringUnavailable,

    #[error("no session for wallet: {0}")]
    NotFound(String),

    #[error("session expired for wallet: {0}")]
    Expired(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("session index is corrupt: {0}")]
    InvalidFormat(String),
}

impl Diagnose for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            SessionError::KeyringUnavailable => ErrorKind::General,
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::Expired(_) => ErrorKind::Authentication,
            SessionError::Io(_) => ErrorKind::General,
            SessionError::InvalidFormat(_) => ErrorKind::General,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SessionError::KeyringUnavailable => {
                Some("no OS keyring backend is available on this machine; pass the password directly".to_string())
            }
            SessionError::NotFound(_) | SessionError::Expired(_) => {
                Some("start a new session with the wallet password".to_string())
            }
            _ => None,
        }
    }
}
