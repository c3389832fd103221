//! The capability the scanner needs from a chain backend. Implementations
//! are opaque to this crate; a mock implementation for tests lives under
//! `#[cfg(test)]` in `scan.rs`.

use async_trait::async_trait;
use sigil_cache::Utxo;

use crate::error::DiscoveryError;

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn list_utxos(&self, address: &str) -> Result<Vec<Utxo>, DiscoveryError>;

    /// True if the address has ever shown any activity, even if its
    /// current UTXO set is empty (e.g. fully spent).
    async fn has_activity(&self, address: &str) -> Result<bool, DiscoveryError>;
}
