//! Error taxonomy for `sigil-discovery`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("chain client error: {0}")]
    ClientError(String),

    #[error("derivation failed: {0}")]
    DerivationFailed(String),

    #[error("insufficient input to cover fee")]
    InsufficientForFee,

    #[error("discovery produced no inputs to migrate")]
    NoInputs,
}

impl Diagnose for DiscoveryError {
    fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::ClientError(_) => ErrorKind::General,
            DiscoveryError::DerivationFailed(_) => ErrorKind::InvalidInput,
            DiscoveryError::InsufficientForFee => ErrorKind::InsufficientFunds,
            DiscoveryError::NoInputs => ErrorKind::InsufficientFunds,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DiscoveryError::InsufficientForFee => {
                Some("lower the fee rate or wait for more funds to accumulate".to_string())
            }
            _ => None,
        }
    }
}
