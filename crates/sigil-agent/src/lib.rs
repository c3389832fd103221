//! Policy-constrained agent credentials for non-interactive wallet use.
//!
//! An agent credential lets a holder of a long-lived token sign within a
//! [`sigil_policy::Policy`] without ever seeing the wallet password. The
//! credential's seed is re-wrapped under a key derived from the token
//! itself, so authentication and decryption are the same operation: a
//! wrong or revoked token simply fails to open the ciphertext.

pub mod counter;
pub mod error;
pub mod model;
pub mod token;

pub use error::AgentError;
pub use model::{CredentialMetadata, CredentialState, DailyCounter, KdfParamsDto, SealedAgentSeed};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use sigil_policy::{Chain, Policy};

const AAD_CONTEXT: &str = "sigil-agent-seed-v1";

pub struct AgentStore {
    root: PathBuf,
}

pub struct NewCredentialRequest<'a> {
    pub wallet_name: &'a str,
    pub label: &'a str,
    pub seed: &'a [u8],
    pub chains: Vec<Chain>,
    pub xpubs: BTreeMap<Chain, String>,
    pub policy: Policy,
    pub ttl: Duration,
}

impl AgentStore {
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, AgentError> {
        Ok(Self { root: home_dir.as_ref().join("agents") })
    }

    fn wallet_dir(&self, wallet_name: &str) -> Result<PathBuf, AgentError> {
        let dir = self.root.join(wallet_name);
        fs::create_dir_all(&dir).map_err(|e| AgentError::Io(e.to_string()))?;
        Ok(dir)
    }

    fn metadata_path(&self, wallet_name: &str, id: &str) -> PathBuf {
        self.root.join(wallet_name).join(format!("{id}.json"))
    }
    fn seed_path(&self, wallet_name: &str, id: &str) -> PathBuf {
        self.root.join(wallet_name).join(format!("{id}.seed"))
    }
    fn counter_path(&self, wallet_name: &str, id: &str) -> PathBuf {
        self.root.join(wallet_name).join(format!("{id}.counter"))
    }

    /// Mints a new credential: derives a wrapping key from the generated
    /// token, seals a copy of `seed` under it, and atomically writes the
    /// credential and seed files together. Returns the full token (shown
    /// to the caller exactly once) and the persisted metadata.
    pub fn create(&self, req: NewCredentialRequest<'_>) -> Result<(String, CredentialMetadata), AgentError> {
        let dir = self.wallet_dir(req.wallet_name)?;
        let (token, id) = token::generate_token();
        if self.metadata_path(req.wallet_name, &id).is_file() {
            return Err(AgentError::CredentialExists);
        }

        let salt = sigil_crypto::generate_salt();
        let kdf_params = sigil_crypto::KdfParams::default();
        let material = token::wrapping_material(&token).ok_or(AgentError::InvalidToken)?;
        let wrapping_key = sigil_crypto::derive_key(material.as_bytes(), &salt, &kdf_params)
            .map_err(|_| AgentError::DecryptionFailed)?;
        let sealed = sigil_crypto::aead::seal(&wrapping_key, req.seed, AAD_CONTEXT.as_bytes())
            .map_err(|_| AgentError::DecryptionFailed)?;

        let now = Utc::now();
        let metadata = CredentialMetadata {
            id: id.clone(),
            label: req.label.to_string(),
            wallet_name: req.wallet_name.to_string(),
            chains: req.chains,
            xpubs: req.xpubs,
            policy: req.policy,
            created_at: now,
            expires_at: now + chrono::Duration::from_std(req.ttl).unwrap_or_else(|_| chrono::Duration::days(30)),
            revoked: false,
        };
        let seed_file = SealedAgentSeed {
            kdf: KdfParamsDto {
                algorithm: kdf_params.algorithm,
                salt_hex: hex::encode(salt),
                memory_kib: kdf_params.memory_kib,
                iterations: kdf_params.iterations,
                parallelism: kdf_params.parallelism,
            },
            nonce_hex: hex::encode(sealed.nonce),
            ciphertext: BASE64.encode(&sealed.ciphertext),
        };

        write_json_atomic(&self.metadata_path(req.wallet_name, &id), &metadata)?;
        write_json_atomic(&self.seed_path(req.wallet_name, &id), &seed_file)?;
        let _ = dir;
        tracing::info!(wallet = req.wallet_name, id, "minted agent credential");
        Ok((token, metadata))
    }

    pub fn get(&self, wallet_name: &str, id: &str) -> Result<CredentialMetadata, AgentError> {
        read_json(&self.metadata_path(wallet_name, id))
            .map_err(|_| AgentError::CredentialNotFound(id.to_string()))
    }

    pub fn list(&self, wallet_name: &str) -> Result<Vec<CredentialMetadata>, AgentError> {
        let dir = self.root.join(wallet_name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| AgentError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| AgentError::Io(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Ok(metadata) = read_json::<CredentialMetadata>(&path) {
                    out.push(metadata);
                }
            }
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    /// Authenticates a presented token and returns the decrypted seed
    /// alongside the credential metadata. Rejects expired or revoked
    /// credentials before attempting decryption.
    pub fn authenticate(&self, wallet_name: &str, full_token: &str) -> Result<(Vec<u8>, CredentialMetadata), AgentError> {
        let id = token::extract_id(full_token).ok_or(AgentError::InvalidToken)?;
        let metadata = self.get(wallet_name, id)?;
        match metadata.state(Utc::now()) {
            CredentialState::Revoked => return Err(AgentError::CredentialRevoked(id.to_string())),
            CredentialState::Expired => return Err(AgentError::CredentialExpired(id.to_string())),
            CredentialState::Active => {}
        }

        let sealed: SealedAgentSeed = read_json(&self.seed_path(wallet_name, id)).map_err(|_| AgentError::InvalidToken)?;
        let material = token::wrapping_material(full_token).ok_or(AgentError::InvalidToken)?;
        let salt = hex::decode(&sealed.kdf.salt_hex).map_err(|_| AgentError::InvalidToken)?;
        let wrapping_key = sigil_crypto::derive_key(material.as_bytes(), &salt, &sealed.kdf.to_kdf_params())
            .map_err(|_| AgentError::InvalidToken)?;
        let nonce_bytes = hex::decode(&sealed.nonce_hex).map_err(|_| AgentError::InvalidToken)?;
        let nonce: [u8; sigil_crypto::aead::NONCE_LEN] =
            nonce_bytes.try_into().map_err(|_| AgentError::InvalidToken)?;
        let ciphertext = BASE64.decode(&sealed.ciphertext).map_err(|_| AgentError::InvalidToken)?;
        let seed = sigil_crypto::aead::open(&wrapping_key, &nonce, &ciphertext, AAD_CONTEXT.as_bytes())
            .map_err(|_| AgentError::InvalidToken)?;
        Ok((seed, metadata))
    }

    pub fn daily_spent(&self, wallet_name: &str, id: &str) -> Result<(u64, String), AgentError> {
        counter::get_daily_spent(&self.counter_path(wallet_name, id))
    }

    pub fn record_spend(&self, wallet_name: &str, id: &str, spent_sat: u64, spent_wei: &str) -> Result<DailyCounter, AgentError> {
        counter::record_spend(&self.counter_path(wallet_name, id), spent_sat, spent_wei)
    }

    /// Irreversibly revokes a credential: deletes its metadata, seed, and
    /// counter files together. Idempotent.
    pub fn revoke(&self, wallet_name: &str, id: &str) -> Result<(), AgentError> {
        for path in [
            self.metadata_path(wallet_name, id),
            self.seed_path(wallet_name, id),
            self.counter_path(wallet_name, id),
        ] {
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| AgentError::Io(e.to_string()))?;
            }
        }
        tracing::info!(wallet = wallet_name, id, "revoked agent credential");
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AgentError> {
    let bytes = fs::read(path).map_err(|e| AgentError::Io(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AgentError::InvalidFormat(e.to_string()))
}

fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), AgentError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| AgentError::InvalidFormat(e.to_string()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| AgentError::Io(e.to_string()))?;
    tmp.write_all(&bytes).map_err(|e| AgentError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| AgentError::Io(e.to_string()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600)).map_err(|e| AgentError::Io(e.to_string()))?;
    }
    tmp.persist(path).map_err(|e| AgentError::Io(e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> Policy {
        Policy {
            chains: vec![Chain::Bsv],
            allowed_addrs: vec![],
            max_per_tx: Some(sigil_policy::Amount::Bsv(50_000)),
            max_daily: Some(sigil_policy::Amount::Bsv(500_000)),
        }
    }

    #[test]
    fn create_and_authenticate_roundtrip() {
        sigil_crypto::use_fast_params_for_tests();
        let tmp = tempfile::tempdir().unwrap();
        let store = AgentStore::open(tmp.path()).unwrap();
        let req = NewCredentialRequest {
            wallet_name: "main",
            label: "ci",
            seed: b"super-secret-seed-bytes",
            chains: vec![Chain::Bsv],
            xpubs: BTreeMap::new(),
            policy: policy(),
            ttl: Duration::from_secs(30 * 24 * 3600),
        };
        let (token, metadata) = store.create(req).unwrap();
        assert_eq!(metadata.state(Utc::now()), CredentialState::Active);

        let (seed, metadata2) = store.authenticate("main", &token).unwrap();
        assert_eq!(seed, b"super-secret-seed-bytes");
        assert_eq!(metadata2.id, metadata.id);
    }

    #[test]
    fn authenticate_rejects_wrong_token() {
        sigil_crypto::use_fast_params_for_tests();
        let tmp = tempfile::tempdir().unwrap();
        let store = AgentStore::open(tmp.path()).unwrap();
        let req = NewCredentialRequest {
            wallet_name: "main",
            label: "ci",
            seed: b"seed",
            chains: vec![Chain::Bsv],
            xpubs: BTreeMap::new(),
            policy: policy(),
            ttl: Duration::from_secs(3600),
        };
        let (_token, _metadata) = store.create(req).unwrap();
        let (other_token, _) = token::generate_token();
        let err = store.authenticate("main", &other_token).unwrap_err();
        assert!(matches!(err, AgentError::InvalidToken | AgentError::CredentialNotFound(_)));
    }

    #[test]
    fn expired_credential_rejected() {
        sigil_crypto::use_fast_params_for_tests();
        let tmp = tempfile::tempdir().unwrap();
        let store = AgentStore::open(tmp.path()).unwrap();
        let req = NewCredentialRequest {
            wallet_name: "main",
            label: "ci",
            seed: b"seed",
            chains: vec![Chain::Bsv],
            xpubs: BTreeMap::new(),
            policy: policy(),
            ttl: Duration::from_secs(0),
        };
        let (token, _metadata) = store.create(req).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        let err = store.authenticate("main", &token).unwrap_err();
        assert!(matches!(err, AgentError::CredentialExpired(_)));
    }

    #[test]
    fn revoke_removes_all_files_and_blocks_auth() {
        sigil_crypto::use_fast_params_for_tests();
        let tmp = tempfile::tempdir().unwrap();
        let store = AgentStore::open(tmp.path()).unwrap();
        let req = NewCredentialRequest {
            wallet_name: "main",
            label: "ci",
            seed: b"seed",
            chains: vec![Chain::Bsv],
            xpubs: BTreeMap::new(),
            policy: policy(),
            ttl: Duration::from_secs(3600),
        };
        let (token, metadata) = store.create(req).unwrap();
        store.revoke("main", &metadata.id).unwrap();
        let err = store.authenticate("main", &token).unwrap_err();
        assert!(matches!(err, AgentError::CredentialNotFound(_)));
        // Idempotent.
        store.revoke("main", &metadata.id).unwrap();
    }

    #[test]
    fn list_returns_minted_credentials() {
        sigil_crypto::use_fast_params_for_tests();
        let tmp = tempfile::tempdir().unwrap();
        let store = AgentStore::open(tmp.path()).unwrap();
        for label in ["a", "b"] {
            let req = NewCredentialRequest {
                wallet_name: "main",
                label,
                seed: b"seed",
                chains: vec![Chain::Bsv],
                xpubs: BTreeMap::new(),
                policy: policy(),
                ttl: Duration::from_secs(3600),
            };
            store.create(req).unwrap();
        }
        assert_eq!(store.list("main").unwrap().len(), 2);
    }
}
