//! Advisory balance and UTXO caching. Readers may observe stale data;
//! staleness is surfaced, never hidden. Corruption in these caches is
//! self-healing — reset with a warning rather than fatal, since nothing
//! here is an authoritative store.

pub mod balance;
pub mod error;
pub mod utxo;

pub use balance::{BalanceCache, BalanceCacheEntry, BalanceKey};
pub use error::CacheError;
pub use utxo::{AddressEntry, RefreshDelta, Utxo, UtxoSource, UtxoStore};
