//! Typed settings schema. Every field has a hardcoded default; a TOML file
//! or environment variable only needs to mention what it overrides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub gap_limit: u32,
    pub concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { gap_limit: 20, concurrency: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub default_ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { default_ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub balance_ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { balance_ttl_secs: 300 }
    }
}

/// Argon2id tuning. Defaults mirror `sigil_crypto::kdf::KdfParams`'s
/// production profile; kept separate so a config override doesn't require
/// a dependency from `sigil-config` onto `sigil-crypto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self { memory_kib: 64 * 1024, iterations: 3, parallelism: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SigilConfig {
    pub discovery: DiscoveryConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
    pub crypto: CryptoConfig,
}
