//! Per-wallet, per-address UTXO store: keeps each address's current UTXO
//! list plus `has_activity`/`label` side-table metadata.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub amount_sat: u64,
    pub script_pubkey: String,
    pub address: String,
    pub confirmations: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub utxos: Vec<Utxo>,
    pub has_activity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Result of replacing an address's UTXO set with a freshly fetched view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshDelta {
    pub added: Vec<Utxo>,
    pub removed: Vec<Utxo>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UtxoStoreFile {
    addresses: BTreeMap<String, AddressEntry>,
}

/// A trait the caller implements per `ChainClient` to fetch an address's
/// current UTXO view and any non-UTXO activity marker (e.g. a spent
/// output with no remaining balance, which still counts as "seen").
pub trait UtxoSource {
    fn current_utxos(&self, address: &str) -> Result<Vec<Utxo>, CacheError>;
    fn has_activity(&self, address: &str) -> Result<bool, CacheError>;
}

pub struct UtxoStore {
    path: PathBuf,
    file: UtxoStoreFile,
}

impl UtxoStore {
    pub fn open(home_dir: impl AsRef<Path>, wallet_name: &str) -> Result<Self, CacheError> {
        let dir = home_dir.as_ref().join("cache").join("utxos");
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io(e.to_string()))?;
        let path = dir.join(format!("{wallet_name}.json"));
        let file = match load(&path) {
            Ok(file) => file,
            Err(CacheError::CorruptCache(reason)) => {
                tracing::warn!(reason, wallet = wallet_name, "utxo store corrupt, preserving backup and resetting");
                if path.is_file() {
                    let _ = std::fs::copy(&path, path.with_extension("json.bak"));
                }
                UtxoStoreFile::default()
            }
            Err(e) => return Err(e),
        };
        Ok(Self { path, file })
    }

    pub fn address(&self, address: &str) -> Option<&AddressEntry> {
        self.file.addresses.get(address)
    }

    pub fn set_label(&mut self, address: &str, label: Option<String>) -> Result<(), CacheError> {
        self.file.addresses.entry(address.to_string()).or_default().label = label;
        self.persist()
    }

    /// Replaces `address`'s UTXO list with `source`'s current view,
    /// updating `has_activity` and returning what changed.
    pub fn refresh_address(&mut self, address: &str, source: &dyn UtxoSource) -> Result<RefreshDelta, CacheError> {
        let fresh = source.current_utxos(address)?;
        let activity = !fresh.is_empty() || source.has_activity(address)?;

        let entry = self.file.addresses.entry(address.to_string()).or_default();
        let previous: BTreeMap<(String, u32), Utxo> =
            entry.utxos.iter().cloned().map(|u| ((u.txid.clone(), u.vout), u)).collect();
        let current: BTreeMap<(String, u32), Utxo> =
            fresh.iter().cloned().map(|u| ((u.txid.clone(), u.vout), u)).collect();

        let added: Vec<Utxo> = current
            .iter()
            .filter(|(k, _)| !previous.contains_key(*k))
            .map(|(_, v)| v.clone())
            .collect();
        let removed: Vec<Utxo> = previous
            .iter()
            .filter(|(k, _)| !current.contains_key(*k))
            .map(|(_, v)| v.clone())
            .collect();

        entry.utxos = fresh;
        entry.has_activity = entry.has_activity || activity;
        self.persist()?;
        Ok(RefreshDelta { added, removed })
    }

    fn persist(&self) -> Result<(), CacheError> {
        write_atomic(&self.path, &self.file)
    }
}

fn load(path: &Path) -> Result<UtxoStoreFile, CacheError> {
    if !path.is_file() {
        return Ok(UtxoStoreFile::default());
    }
    let bytes = std::fs::read(path).map_err(|e| CacheError::Io(e.to_string()))?;
    if bytes.is_empty() {
        return Ok(UtxoStoreFile::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| CacheError::CorruptCache(e.to_string()))
}

fn write_atomic(path: &Path, file: &UtxoStoreFile) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec_pretty(file).map_err(|e| CacheError::Io(e.to_string()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CacheError::Io(e.to_string()))?;
    tmp.write_all(&bytes).map_err(|e| CacheError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| CacheError::Io(e.to_string()))?;
    tmp.persist(path).map_err(|e| CacheError::Io(e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeSource {
        utxos: RefCell<Vec<Utxo>>,
    }

    impl UtxoSource for FakeSource {
        fn current_utxos(&self, _address: &str) -> Result<Vec<Utxo>, CacheError> {
            Ok(self.utxos.borrow().clone())
        }
        fn has_activity(&self, _address: &str) -> Result<bool, CacheError> {
            Ok(!self.utxos.borrow().is_empty())
        }
    }

    fn utxo(txid: &str, vout: u32, amount: u64) -> Utxo {
        Utxo { txid: txid.to_string(), vout, amount_sat: amount, script_pubkey: "76a914...88ac".to_string(), address: "1Addr".to_string(), confirmations: 1 }
    }

    #[test]
    fn refresh_replaces_and_reports_delta() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = UtxoStore::open(tmp.path(), "main").unwrap();
        let source = FakeSource { utxos: RefCell::new(vec![utxo("a", 0, 1000)]) };

        let delta = store.refresh_address("1Addr", &source).unwrap();
        assert_eq!(delta.added.len(), 1);
        assert_eq!(delta.removed.len(), 0);
        assert!(store.address("1Addr").unwrap().has_activity);

        *source.utxos.borrow_mut() = vec![utxo("b", 0, 2000)];
        let delta = store.refresh_address("1Addr", &source).unwrap();
        assert_eq!(delta.added.len(), 1);
        assert_eq!(delta.removed.len(), 1);
        assert_eq!(delta.removed[0].txid, "a");
    }

    #[test]
    fn activity_sticky_once_seen() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = UtxoStore::open(tmp.path(), "main").unwrap();
        let source = FakeSource { utxos: RefCell::new(vec![utxo("a", 0, 1000)]) };
        store.refresh_address("1Addr", &source).unwrap();

        *source.utxos.borrow_mut() = vec![];
        store.refresh_address("1Addr", &source).unwrap();
        assert!(store.address("1Addr").unwrap().has_activity);
        assert!(store.address("1Addr").unwrap().utxos.is_empty());
    }

    #[test]
    fn corrupt_file_backs_up_and_resets() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("cache/utxos")).unwrap();
        std::fs::write(tmp.path().join("cache/utxos/main.json"), b"not json").unwrap();
        let store = UtxoStore::open(tmp.path(), "main").unwrap();
        assert!(store.address("1Addr").is_none());
        assert!(tmp.path().join("cache/utxos/main.json.bak").is_file());
    }
}
