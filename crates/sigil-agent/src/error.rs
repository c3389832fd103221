//! Error taxonomy for `sigil-agent`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("no credential found: {0}")]
    CredentialNotFound(String),

    #[error("credential expired: {0}")]
    CredentialExpired(String),

    #[error("credential revoked: {0}")]
    CredentialRevoked(String),

    #[error("invalid or unrecognized token")]
    InvalidToken,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("credential already exists for this id")]
    CredentialExists,

    #[error("spend rejected by policy: {0}")]
    PolicyDenied(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid credential or counter file: {0}")]
    InvalidFormat(String),
}

impl Diagnose for AgentError {
    fn kind(&self) -> ErrorKind {
        match self {
            AgentError::CredentialNotFound(_) => ErrorKind::NotFound,
            AgentError::CredentialExpired(_)
            | AgentError::CredentialRevoked(_)
            | AgentError::InvalidToken => ErrorKind::Authentication,
            AgentError::DecryptionFailed => ErrorKind::DecryptionFailed,
            AgentError::CredentialExists => ErrorKind::WalletExists,
            AgentError::PolicyDenied(_) => ErrorKind::PolicyDenied,
            AgentError::Io(_) | AgentError::InvalidFormat(_) => ErrorKind::General,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            AgentError::InvalidToken => Some("check the token was copied in full".to_string()),
            AgentError::CredentialExpired(_) => Some("issue a new agent credential".to_string()),
            AgentError::PolicyDenied(reason) => Some(format!("policy rejected this spend: {reason}")),
            _ => None,
        }
    }
}
