//! On-disk credential, sealed-seed, and daily-counter data model.
//!
//! Three sibling files per credential: `<id>.json` (metadata, readable
//! without the token), `<id>.seed` (the token-wrapped seed ciphertext),
//! and `<id>.counter` (the rolling daily spend).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sigil_policy::{Chain, Policy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParamsDto {
    pub algorithm: String,
    pub salt_hex: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl KdfParamsDto {
    pub fn to_kdf_params(&self) -> sigil_crypto::KdfParams {
        sigil_crypto::KdfParams {
            algorithm: self.algorithm.clone(),
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

/// `<id>.json`: everything about a credential except the seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialMetadata {
    pub id: String,
    pub label: String,
    pub wallet_name: String,
    pub chains: Vec<Chain>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub xpubs: BTreeMap<Chain, String>,
    pub policy: Policy,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Active,
    Expired,
    Revoked,
}

impl CredentialMetadata {
    pub fn state(&self, now: DateTime<Utc>) -> CredentialState {
        if self.revoked {
            CredentialState::Revoked
        } else if now >= self.expires_at {
            CredentialState::Expired
        } else {
            CredentialState::Active
        }
    }
}

/// `<id>.seed`: the wallet seed sealed under a key derived from the
/// token via the same KDF the wallet file uses for passwords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedAgentSeed {
    pub kdf: KdfParamsDto,
    pub nonce_hex: String,
    pub ciphertext: String,
}

/// `<id>.counter`: per-day cumulative spend, reset whenever `day` is not
/// today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCounter {
    pub day: NaiveDate,
    pub spent_sat: u64,
    pub spent_wei: String,
}

impl DailyCounter {
    pub fn zero(day: NaiveDate) -> Self {
        Self { day, spent_sat: 0, spent_wei: "0".to_string() }
    }

    /// Returns the counter as-of `today`, rolling over to zero if the
    /// recorded day has passed.
    pub fn rolled_over(&self, today: NaiveDate) -> Self {
        if self.day == today {
            self.clone()
        } else {
            Self::zero(today)
        }
    }
}
