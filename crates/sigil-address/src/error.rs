//! Error taxonomy for `sigil-address`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    #[error("invalid hex key: {0}")]
    InvalidHexKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl Diagnose for AddressError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }

    fn suggestion(&self) -> Option<String> {
        Some("check the input format and try again".to_string())
    }
}
