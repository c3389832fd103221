//! On-disk wallet data model, matching the sealed wallet file schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sigil_hdkey::CoinType;

pub const CURRENT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "BSV")]
    Bsv,
}

impl ChainId {
    pub fn as_coin_type(self) -> CoinType {
        match self {
            ChainId::Eth => CoinType::Eth,
            ChainId::Bsv => CoinType::Bsv,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChainId::Eth => "ETH",
            ChainId::Bsv => "BSV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub index: u32,
    pub path: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParamsDto {
    pub algorithm: String,
    pub salt_hex: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Wallet metadata, readable without a password: everything in a sealed
/// wallet file except the encrypted seed material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletMetadata {
    pub version: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub enabled_chains: Vec<ChainId>,
    pub addresses: std::collections::BTreeMap<ChainId, Vec<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_addresses: Option<std::collections::BTreeMap<ChainId, Vec<Address>>>,
}

/// The full on-disk representation of `<home>/wallets/<name>.wallet`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedWalletFile {
    pub version: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub enabled_chains: Vec<ChainId>,
    pub addresses: std::collections::BTreeMap<ChainId, Vec<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_addresses: Option<std::collections::BTreeMap<ChainId, Vec<Address>>>,
    pub kdf: KdfParamsDto,
    pub encrypted_seed: String,
    pub mac: String,
}

impl SealedWalletFile {
    pub fn metadata(&self) -> WalletMetadata {
        WalletMetadata {
            version: self.version,
            name: self.name.clone(),
            created_at: self.created_at,
            enabled_chains: self.enabled_chains.clone(),
            addresses: self.addresses.clone(),
            change_addresses: self.change_addresses.clone(),
        }
    }
}

// `ChainId` needs `Ord` to live as a `BTreeMap` key.
impl PartialOrd for ChainId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChainId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}
