//! Sealed wallet file persistence: atomic save/load/list/delete.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use sigil_hdkey::CoinType;

use crate::error::WalletStoreError;
use crate::model::{Address, ChainId, KdfParamsDto, SealedWalletFile, WalletMetadata, CURRENT_FORMAT_VERSION};

/// Directory-backed store rooted at `<home>/wallets`.
pub struct WalletStore {
    dir: PathBuf,
}

/// Everything needed to seal a freshly derived wallet: the receive (and
/// optional change) addresses per chain, plus the already-encrypted seed.
pub struct NewWallet {
    pub name: String,
    pub enabled_chains: Vec<ChainId>,
    pub addresses: BTreeMap<ChainId, Vec<Address>>,
    pub change_addresses: Option<BTreeMap<ChainId, Vec<Address>>>,
    pub kdf: KdfParamsDto,
    pub encrypted_seed: Vec<u8>,
    pub mac: Vec<u8>,
}

impl WalletStore {
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, WalletStoreError> {
        let dir = home_dir.as_ref().join("wallets");
        fs::create_dir_all(&dir).map_err(|e| WalletStoreError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, WalletStoreError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.wallet")))
    }

    pub fn exists(&self, name: &str) -> Result<bool, WalletStoreError> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Writes a new sealed wallet file. Fails with `WalletExists` if a
    /// wallet with the same name is already on disk.
    pub fn save(&self, wallet: &NewWallet) -> Result<(), WalletStoreError> {
        let path = self.path_for(&wallet.name)?;
        if path.is_file() {
            return Err(WalletStoreError::WalletExists(wallet.name.clone()));
        }
        let file = SealedWalletFile {
            version: CURRENT_FORMAT_VERSION,
            name: wallet.name.clone(),
            created_at: Utc::now(),
            enabled_chains: wallet.enabled_chains.clone(),
            addresses: wallet.addresses.clone(),
            change_addresses: wallet.change_addresses.clone(),
            kdf: wallet.kdf.clone(),
            encrypted_seed: BASE64.encode(&wallet.encrypted_seed),
            mac: BASE64.encode(&wallet.mac),
        };
        write_atomic(&path, &file)?;
        tracing::info!(wallet = %wallet.name, "wrote new sealed wallet file");
        Ok(())
    }

    /// Overwrites an existing sealed wallet file (used after an address
    /// gap-limit scan extends `addresses`, or a format-version upgrade).
    pub fn overwrite(&self, file: &SealedWalletFile) -> Result<(), WalletStoreError> {
        let path = self.path_for(&file.name)?;
        write_atomic(&path, file)
    }

    /// Loads a sealed wallet file's metadata and ciphertext without
    /// decrypting. Callers decrypt `encrypted_seed` themselves (see
    /// `sigil-crypto::aead::open`) and zeroize the resulting seed buffer.
    pub fn load(&self, name: &str) -> Result<SealedWalletFile, WalletStoreError> {
        let path = self.path_for(name)?;
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WalletStoreError::WalletNotFound(name.to_string())
            } else {
                WalletStoreError::Io(e.to_string())
            }
        })?;
        let file: SealedWalletFile = serde_json::from_slice(&bytes)
            .map_err(|e| WalletStoreError::InvalidFormat(e.to_string()))?;
        if file.version > CURRENT_FORMAT_VERSION {
            return Err(WalletStoreError::InvalidFormat(format!(
                "unsupported wallet format version {}",
                file.version
            )));
        }
        Ok(file)
    }

    pub fn load_metadata(&self, name: &str) -> Result<WalletMetadata, WalletStoreError> {
        Ok(self.load(name)?.metadata())
    }

    pub fn list(&self) -> Result<Vec<String>, WalletStoreError> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| WalletStoreError::Io(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| WalletStoreError::Io(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("wallet") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), WalletStoreError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WalletStoreError::WalletNotFound(name.to_string())
            } else {
                WalletStoreError::Io(e.to_string())
            }
        })?;
        tracing::info!(wallet = %name, "deleted sealed wallet file");
        Ok(())
    }
}

/// Decodes the base64 ciphertext fields of a sealed wallet file.
pub fn decode_ciphertext(file: &SealedWalletFile) -> Result<(Vec<u8>, Vec<u8>), WalletStoreError> {
    let seed = BASE64
        .decode(&file.encrypted_seed)
        .map_err(|e| WalletStoreError::InvalidFormat(format!("encrypted_seed: {e}")))?;
    let mac = BASE64
        .decode(&file.mac)
        .map_err(|e| WalletStoreError::InvalidFormat(format!("mac: {e}")))?;
    Ok((seed, mac))
}

pub fn coin_type_for(chain: ChainId) -> CoinType {
    chain.as_coin_type()
}

fn validate_name(name: &str) -> Result<(), WalletStoreError> {
    if name.is_empty()
        || name.len() > 64
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(WalletStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Writes `value` as JSON to `path` via write-to-temp + fsync + rename, so
/// a crash mid-write leaves either the old file or the new file intact,
/// never a partial one. File permissions are restricted to owner
/// read/write.
fn write_atomic(path: &Path, value: &SealedWalletFile) -> Result<(), WalletStoreError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| WalletStoreError::InvalidFormat(e.to_string()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| WalletStoreError::Io(e.to_string()))?;
    tmp.write_all(&bytes).map_err(|e| WalletStoreError::Io(e.to_string()))?;
    tmp.flush().map_err(|e| WalletStoreError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| WalletStoreError::Io(e.to_string()))?;
    set_owner_only(tmp.path()).map_err(|e| WalletStoreError::Io(e.to_string()))?;
    tmp.persist(path).map_err(|e| WalletStoreError::Io(e.error.to_string()))?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> NewWallet {
        let mut addresses = BTreeMap::new();
        addresses.insert(
            ChainId::Eth,
            vec![Address {
                index: 0,
                path: "m/44'/60'/0'/0/0".to_string(),
                address: "0x0000000000000000000000000000000000000000".to_string(),
            }],
        );
        NewWallet {
            name: name.to_string(),
            enabled_chains: vec![ChainId::Eth],
            addresses,
            change_addresses: None,
            kdf: KdfParamsDto {
                algorithm: "argon2id".to_string(),
                salt_hex: "00".repeat(32),
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            encrypted_seed: vec![1, 2, 3, 4],
            mac: vec![5, 6, 7, 8],
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        store.save(&sample("alpha")).unwrap();

        let loaded = store.load("alpha").unwrap();
        assert_eq!(loaded.name, "alpha");
        let (seed, mac) = decode_ciphertext(&loaded).unwrap();
        assert_eq!(seed, vec![1, 2, 3, 4]);
        assert_eq!(mac, vec![5, 6, 7, 8]);
    }

    #[test]
    fn save_existing_name_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        store.save(&sample("alpha")).unwrap();
        let err = store.save(&sample("alpha")).unwrap_err();
        assert!(matches!(err, WalletStoreError::WalletExists(_)));
    }

    #[test]
    fn load_missing_wallet_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        let err = store.load("nope").unwrap_err();
        assert!(matches!(err, WalletStoreError::WalletNotFound(_)));
    }

    #[test]
    fn load_corrupt_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        fs::write(tmp.path().join("wallets/broken.wallet"), b"not json").unwrap();
        let err = store.load("broken").unwrap_err();
        assert!(matches!(err, WalletStoreError::InvalidFormat(_)));
    }

    #[test]
    fn list_and_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        store.save(&sample("alpha")).unwrap();
        store.save(&sample("beta")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha".to_string(), "beta".to_string()]);

        store.delete("alpha").unwrap();
        assert_eq!(store.list().unwrap(), vec!["beta".to_string()]);
        assert!(matches!(store.delete("alpha").unwrap_err(), WalletStoreError::WalletNotFound(_)));
    }

    #[test]
    fn rejects_invalid_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        let mut w = sample("bad name!");
        w.name = "bad name!".to_string();
        assert!(matches!(store.save(&w).unwrap_err(), WalletStoreError::InvalidName(_)));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::open(tmp.path()).unwrap();
        store.save(&sample("alpha")).unwrap();
        let meta = fs::metadata(tmp.path().join("wallets/alpha.wallet")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }
}
