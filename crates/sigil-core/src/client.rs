//! The chain-client capability seam: ETH and BSV variants of an opaque,
//! caller-supplied backend. No networking crate is wired in here — per
//! spec, the two chain RPC adapters are out of scope and a caller
//! registers its own `Arc<dyn ChainClient>` per chain.

use std::sync::Arc;

pub use sigil_discovery::ChainClient;
use sigil_policy::Chain;

/// Registry of chain backends a `Context` can dispatch discovery and
/// balance queries through. Either slot may be empty; callers that never
/// configure a chain simply can't discover or spend on it.
#[derive(Clone, Default)]
pub struct ChainClients {
    pub eth: Option<Arc<dyn ChainClient>>,
    pub bsv: Option<Arc<dyn ChainClient>>,
}

impl ChainClients {
    pub fn get(&self, chain: Chain) -> Option<Arc<dyn ChainClient>> {
        match chain {
            Chain::Eth => self.eth.clone(),
            Chain::Bsv => self.bsv.clone(),
        }
    }

    pub fn set(&mut self, chain: Chain, client: Arc<dyn ChainClient>) {
        match chain {
            Chain::Eth => self.eth = Some(client),
            Chain::Bsv => self.bsv = Some(client),
        }
    }
}
