//! Error taxonomy for `sigil-hdkey`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HdKeyError {
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("derivation produced an invalid key (probability ~2^-127, seed+path combination unusable)")]
    DerivationFailed,
}

impl Diagnose for HdKeyError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            HdKeyError::InvalidPath(_) => {
                Some("account/change/index must be less than 2^31".to_string())
            }
            HdKeyError::DerivationFailed => None,
        }
    }
}
