//! BIP32 master/child derivation and BIP44 paths across coin types.

pub mod coin;
pub mod derive;
pub mod error;

pub use coin::CoinType;
pub use derive::{derive, derive_account_xpub, derive_legacy, uncompressed_pubkey, DerivedKey, HARDENED_OFFSET};
pub use error::HdKeyError;
