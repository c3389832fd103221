//! Error taxonomy for `sigil-cache`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Advisory cache corruption; callers should warn and reset rather
    /// than propagate this to the user as a fatal error.
    #[error("cache file is corrupt: {0}")]
    CorruptCache(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl Diagnose for CacheError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::General
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CacheError::CorruptCache(_) => Some("the cache will be reset automatically on next write".to_string()),
            CacheError::Io(_) => None,
        }
    }
}
