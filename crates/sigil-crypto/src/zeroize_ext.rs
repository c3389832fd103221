//! Secret hygiene helpers.
//!
//! A seed, password, or derived key must never be dropped without being
//! overwritten. [`zeroize`] is the primitive; [`Secret`] is a small
//! owned-buffer wrapper that zeroizes on every exit path automatically.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Overwrites every byte of `buf` with zero.
pub fn zeroize(buf: &mut [u8]) {
    buf.zeroize();
}

/// An owned secret byte buffer that zeroizes itself on drop and never
/// prints its contents via `Debug`.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: Vec<u8>) -> Self {
        Secret(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret({} bytes, redacted)", self.0.len())
    }
}
