//! Balance cache: `(chain, address, token)` -> `BalanceCacheEntry`, with
//! TTL-based staleness and atomic persistence.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    pub chain: String,
    pub address: String,
    /// Empty string for the chain's native asset.
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceCacheEntry {
    pub chain: String,
    pub address: String,
    pub token: String,
    pub balance: String,
    pub unconfirmed: String,
    pub symbol: String,
    pub decimals: u32,
    pub updated_at: DateTime<Utc>,
}

impl BalanceCacheEntry {
    fn key(&self) -> BalanceKey {
        BalanceKey { chain: self.chain.clone(), address: self.address.clone(), token: self.token.clone() }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.updated_at
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BalanceCacheFile {
    entries: Vec<BalanceCacheEntry>,
}

pub struct BalanceCache {
    path: PathBuf,
    entries: BTreeMap<BalanceKey, BalanceCacheEntry>,
}

impl BalanceCache {
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = home_dir.as_ref().join("cache");
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io(e.to_string()))?;
        let path = dir.join("balances.json");
        let entries = match load(&path) {
            Ok(entries) => entries,
            Err(CacheError::CorruptCache(reason)) => {
                tracing::warn!(reason, "balance cache corrupt, resetting");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &BalanceKey, now: DateTime<Utc>) -> (Option<&BalanceCacheEntry>, bool, Option<Duration>) {
        match self.entries.get(key) {
            Some(entry) => (Some(entry), true, Some(entry.age(now))),
            None => (None, false, None),
        }
    }

    pub fn set(&mut self, entry: BalanceCacheEntry) -> Result<(), CacheError> {
        self.entries.insert(entry.key(), entry);
        self.persist()
    }

    pub fn is_stale(&self, key: &BalanceKey, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.entries.get(key) {
            Some(entry) => entry.age(now) > ttl,
            None => true,
        }
    }

    /// Drops every entry older than `older_than`, relative to `now`.
    pub fn prune(&mut self, older_than: Duration, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.age(now) <= older_than);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        self.persist()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    fn persist(&self) -> Result<(), CacheError> {
        let file = BalanceCacheFile { entries: self.entries.values().cloned().collect() };
        write_atomic(&self.path, &file)
    }
}

fn load(path: &Path) -> Result<BTreeMap<BalanceKey, BalanceCacheEntry>, CacheError> {
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }
    let bytes = std::fs::read(path).map_err(|e| CacheError::Io(e.to_string()))?;
    if bytes.is_empty() {
        return Ok(BTreeMap::new());
    }
    let file: BalanceCacheFile =
        serde_json::from_slice(&bytes).map_err(|e| CacheError::CorruptCache(e.to_string()))?;
    Ok(file.entries.into_iter().map(|e| (e.key(), e)).collect())
}

fn write_atomic(path: &Path, file: &BalanceCacheFile) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec_pretty(file).map_err(|e| CacheError::Io(e.to_string()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CacheError::Io(e.to_string()))?;
    tmp.write_all(&bytes).map_err(|e| CacheError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| CacheError::Io(e.to_string()))?;
    tmp.persist(path).map_err(|e| CacheError::Io(e.error.to_string()))?;
    Ok(())
}
