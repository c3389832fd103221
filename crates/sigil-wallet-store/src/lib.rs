//! Versioned, sealed wallet file persistence.
//!
//! A sealed wallet file pairs plaintext metadata (names, enabled chains,
//! derived addresses) with an encrypted seed, mirroring the split the
//! teacher's wallet file uses between its header and its encrypted
//! payload, except writes here are atomic: every save goes through a
//! temp file, fsync, then rename, so a crash mid-write can never leave a
//! half-written `.wallet` file on disk.

pub mod error;
pub mod model;
pub mod store;

pub use error::WalletStoreError;
pub use model::{
    Address, ChainId, KdfParamsDto, SealedWalletFile, WalletMetadata, CURRENT_FORMAT_VERSION,
};
pub use store::{coin_type_for, decode_ciphertext, NewWallet, WalletStore};

/// AEAD associated data for sealing a wallet's seed. Shared so any caller
/// that seals or opens `encrypted_seed` (wallet creation, restore from
/// backup) agrees on the same context string.
pub const SEED_AAD_CONTEXT: &str = "sigil-wallet-seed-v1";
