//! Shared error taxonomy for the Sigil wallet core.
//!
//! Every leaf crate keeps its own narrow `thiserror` enum and implements
//! [`Diagnose`] on it so the taxonomy (exit code, user-facing suggestion)
//! is defined once. The concrete aggregate error lives in `sigil-core`,
//! which is the only crate positioned to depend on every leaf.

use std::fmt;

/// Coarse category an error falls into, independent of which crate raised it.
///
/// Mirrors the exit-code table a CLI driving this core would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    General,
    InvalidInput,
    InvalidMnemonic,
    WalletExists,
    Authentication,
    DecryptionFailed,
    Permission,
    InsufficientFunds,
    PolicyDenied,
    NotFound,
    WalletNotFound,
    ConfigNotFound,
}

impl ErrorKind {
    /// Process exit code for this kind, per the external-interface table.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::General => 1,
            ErrorKind::InvalidInput | ErrorKind::InvalidMnemonic | ErrorKind::WalletExists => 2,
            ErrorKind::Authentication | ErrorKind::DecryptionFailed => 3,
            ErrorKind::Permission | ErrorKind::InsufficientFunds | ErrorKind::PolicyDenied => 4,
            ErrorKind::NotFound | ErrorKind::WalletNotFound | ErrorKind::ConfigNotFound => 5,
        }
    }
}

/// Implemented by every per-crate error enum so a caller can classify and
/// decorate an error without matching on its concrete variants.
pub trait Diagnose: std::error::Error {
    fn kind(&self) -> ErrorKind;

    /// A short actionable hint for the user-facing surface, if one applies.
    fn suggestion(&self) -> Option<String> {
        None
    }
}

/// Wraps an error's message with its suggestion, the shape the CLI surface
/// in §7 decorates errors with: `"{message} (hint: {suggestion})"`.
pub struct Decorated<'a, E: Diagnose>(pub &'a E);

impl<'a, E: Diagnose> fmt::Display for Decorated<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.suggestion() {
            Some(hint) => write!(f, "{} (hint: {hint})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
