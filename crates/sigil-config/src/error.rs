//! Error taxonomy for `sigil-config`.

use sigil_errors::{Diagnose, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("invalid config: {0}")]
    InvalidFormat(String),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("io error: {0}")]
    Io(String),
}

impl Diagnose for ConfigError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::NotFound(_) => ErrorKind::ConfigNotFound,
            ConfigError::InvalidFormat(_) => ErrorKind::InvalidInput,
            ConfigError::UnknownKey(_) => ErrorKind::InvalidInput,
            ConfigError::Io(_) => ErrorKind::General,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ConfigError::UnknownKey(key) => {
                Some(format!("'{key}' is not a recognized dotted config path"))
            }
            _ => None,
        }
    }
}
