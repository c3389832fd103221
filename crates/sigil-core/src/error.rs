//! The concrete error aggregate. `sigil-core` is the only crate positioned
//! to depend on every leaf, so it's the only place this can live.
//!
//! `sigil-policy` has no variant here: its evaluator is pure and total (see
//! `sigil_policy::evaluate`), so a denial surfaces as data
//! (`PolicyDecision`), and callers like `sigil-agent` turn that into their
//! own `PolicyDenied` error variant instead of `sigil-policy` ever failing.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigilError {
    #[error(transparent)]
    Crypto(#[from] sigil_crypto::CryptoError),

    #[error(transparent)]
    Bip39(#[from] sigil_bip39::Bip39Error),

    #[error(transparent)]
    HdKey(#[from] sigil_hdkey::HdKeyError),

    #[error(transparent)]
    Address(#[from] sigil_address::AddressError),

    #[error(transparent)]
    WalletStore(#[from] sigil_wallet_store::WalletStoreError),

    #[error(transparent)]
    Session(#[from] sigil_session::SessionError),

    #[error(transparent)]
    Agent(#[from] sigil_agent::AgentError),

    #[error(transparent)]
    Cache(#[from] sigil_cache::CacheError),

    #[error(transparent)]
    Discovery(#[from] sigil_discovery::DiscoveryError),

    #[error(transparent)]
    Backup(#[from] sigil_backup::BackupError),

    #[error(transparent)]
    Config(#[from] sigil_config::ConfigError),

    /// An "impossible" internal state, per spec §9's note that panics map
    /// to an internal-error variant returned to the caller rather than
    /// propagating a process abort.
    #[error("internal invariant breach: {0}")]
    Internal(String),
}

impl Diagnose for SigilError {
    fn kind(&self) -> ErrorKind {
        match self {
            SigilError::Crypto(e) => e.kind(),
            SigilError::Bip39(e) => e.kind(),
            SigilError::HdKey(e) => e.kind(),
            SigilError::Address(e) => e.kind(),
            SigilError::WalletStore(e) => e.kind(),
            SigilError::Session(e) => e.kind(),
            SigilError::Agent(e) => e.kind(),
            SigilError::Cache(e) => e.kind(),
            SigilError::Discovery(e) => e.kind(),
            SigilError::Backup(e) => e.kind(),
            SigilError::Config(e) => e.kind(),
            SigilError::Internal(_) => ErrorKind::General,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SigilError::Crypto(e) => e.suggestion(),
            SigilError::Bip39(e) => e.suggestion(),
            SigilError::HdKey(e) => e.suggestion(),
            SigilError::Address(e) => e.suggestion(),
            SigilError::WalletStore(e) => e.suggestion(),
            SigilError::Session(e) => e.suggestion(),
            SigilError::Agent(e) => e.suggestion(),
            SigilError::Cache(e) => e.suggestion(),
            SigilError::Discovery(e) => e.suggestion(),
            SigilError::Backup(e) => e.suggestion(),
            SigilError::Config(e) => e.suggestion(),
            SigilError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_errors::Decorated;

    #[test]
    fn wraps_and_classifies_leaf_errors() {
        let err: SigilError = sigil_wallet_store::WalletStoreError::WalletExists("main".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::WalletExists);
    }

    #[test]
    fn decorated_display_passes_through_suggestion() {
        let err: SigilError = sigil_backup::BackupError::BackupCorrupted.into();
        let decorated = Decorated(&err).to_string();
        assert!(decorated.contains("hint:"));
    }
}
