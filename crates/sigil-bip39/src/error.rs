//! Error taxonomy for `sigil-bip39`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Bip39Error {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("unsupported word count: {0} (expected 12 or 24)")]
    UnsupportedWordCount(usize),
}

impl Diagnose for Bip39Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidMnemonic
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Bip39Error::InvalidMnemonic(_) => {
                Some("run typo detection on the phrase to find the offending word".to_string())
            }
            Bip39Error::UnsupportedWordCount(_) => {
                Some("use a 12-word or 24-word mnemonic".to_string())
            }
        }
    }
}
