//! Encrypted, checksummed wallet backups.
//!
//! A backup envelope pairs a plaintext manifest (readable without a
//! password, for listing and sanity checks) with an AEAD-sealed blob of
//! the wallet's seed and metadata, plus a SHA-256 checksum over the
//! envelope's own canonical serialization so tampering is detectable
//! before anyone tries to decrypt anything.

pub mod error;
pub mod model;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use sigil_wallet_store::{decode_ciphertext, ChainId, NewWallet, WalletStore, SEED_AAD_CONTEXT};

pub use error::BackupError;
pub use model::{
    BackupEnvelope, BackupManifest, BackupPayload, BackupPlaintext, EncryptedData,
    CURRENT_BACKUP_VERSION, ENCRYPTION_METHOD,
};

const BACKUP_AAD_CONTEXT: &str = "sigil-backup-v1";

pub struct BackupManager {
    dir: PathBuf,
}

impl BackupManager {
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, BackupError> {
        let dir = home_dir.as_ref().join("backups");
        fs::create_dir_all(&dir).map_err(|e| BackupError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    /// Loads `name` from `wallet_store` with `password`, seals its
    /// `(seed, metadata)` pair under a freshly salted Argon2id key derived
    /// from the same password, and writes the result atomically to
    /// `<home>/backups/<name>-<timestamp>.sigil`.
    pub fn create(
        &self,
        wallet_store: &WalletStore,
        name: &str,
        password: &[u8],
    ) -> Result<(BackupEnvelope, PathBuf), BackupError> {
        let sealed = wallet_store.load(name)?;
        let metadata = sealed.metadata();
        let (encrypted_seed, _mac) = decode_ciphertext(&sealed)?;
        let wallet_key = derive_wallet_key(password, &sealed.kdf)?;
        let seed = decrypt_wallet_seed(&wallet_key, &encrypted_seed)?;

        let plaintext = BackupPlaintext { seed_hex: hex::encode(&seed), metadata: metadata.clone() };
        let plaintext_bytes =
            serde_json::to_vec(&plaintext).map_err(|e| BackupError::InvalidFormat(e.to_string()))?;

        let backup_params = sigil_crypto::KdfParams::default();
        let salt = sigil_crypto::generate_salt();
        let backup_key = sigil_crypto::derive_key(password, &salt, &backup_params)
            .map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
        let sealed_payload = sigil_crypto::seal(&backup_key, &plaintext_bytes, BACKUP_AAD_CONTEXT.as_bytes())
            .map_err(|e| BackupError::InvalidFormat(e.to_string()))?;

        let address_counts: std::collections::BTreeMap<ChainId, usize> = metadata
            .addresses
            .iter()
            .map(|(chain, addrs)| (*chain, addrs.len()))
            .collect();

        let manifest = BackupManifest {
            wallet_name: metadata.name.clone(),
            created_at: Utc::now(),
            chains: metadata.enabled_chains.clone(),
            address_counts,
            encryption_method: ENCRYPTION_METHOD.to_string(),
        };

        let encrypted_data = EncryptedData {
            algorithm: backup_params.algorithm.clone(),
            salt_hex: hex::encode(salt),
            memory_kib: backup_params.memory_kib,
            iterations: backup_params.iterations,
            parallelism: backup_params.parallelism,
            nonce_hex: hex::encode(sealed_payload.nonce),
            ciphertext_hex: hex::encode(sealed_payload.ciphertext),
        };

        let payload = BackupPayload { version: CURRENT_BACKUP_VERSION, manifest: manifest.clone(), encrypted_data: encrypted_data.clone() };
        let checksum = checksum_of(&payload)?;

        let envelope = BackupEnvelope { version: CURRENT_BACKUP_VERSION, manifest, encrypted_data, checksum };

        let path = self.dir.join(format!("{name}-{}.sigil", Utc::now().format("%Y-%m-%d-%H%M%S")));
        write_atomic(&path, &envelope)?;
        tracing::info!(wallet = %name, path = %path.display(), "wrote backup envelope");
        Ok((envelope, path))
    }

    /// Checks the envelope's structure and checksum, without touching the
    /// password-protected payload.
    pub fn verify(&self, path: &Path) -> Result<BackupManifest, BackupError> {
        let envelope = self.read_envelope(path)?;
        verify_checksum(&envelope)?;
        Ok(envelope.manifest)
    }

    /// `verify` plus a trial decryption of the sealed payload.
    pub fn verify_with_decryption(&self, path: &Path, password: &[u8]) -> Result<BackupManifest, BackupError> {
        let envelope = self.read_envelope(path)?;
        verify_checksum(&envelope)?;
        decrypt_payload(&envelope, password)?;
        Ok(envelope.manifest)
    }

    /// Verifies, decrypts, and re-seals the seed under a fresh wallet-store
    /// key, saving it as `new_name` (or the backup's original wallet name).
    /// Fails with `WalletExists` if the target name is already taken.
    pub fn restore(
        &self,
        wallet_store: &WalletStore,
        path: &Path,
        password: &[u8],
        new_name: Option<&str>,
    ) -> Result<(), BackupError> {
        let envelope = self.read_envelope(path)?;
        verify_checksum(&envelope)?;
        let plaintext = decrypt_payload(&envelope, password)?;

        let target_name = new_name.unwrap_or(&envelope.manifest.wallet_name);
        if wallet_store.exists(target_name)? {
            return Err(BackupError::WalletExists(target_name.to_string()));
        }

        let seed = hex::decode(&plaintext.seed_hex).map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
        let wallet_params = sigil_crypto::KdfParams::default();
        let wallet_salt = sigil_crypto::generate_salt();
        let wallet_key = sigil_crypto::derive_key(password, &wallet_salt, &wallet_params)
            .map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
        let sealed = sigil_crypto::seal(&wallet_key, &seed, SEED_AAD_CONTEXT.as_bytes())
            .map_err(|e| BackupError::InvalidFormat(e.to_string()))?;

        let new_wallet = NewWallet {
            name: target_name.to_string(),
            enabled_chains: plaintext.metadata.enabled_chains.clone(),
            addresses: plaintext.metadata.addresses.clone(),
            change_addresses: plaintext.metadata.change_addresses.clone(),
            kdf: sigil_wallet_store::KdfParamsDto {
                algorithm: wallet_params.algorithm,
                salt_hex: hex::encode(wallet_salt),
                memory_kib: wallet_params.memory_kib,
                iterations: wallet_params.iterations,
                parallelism: wallet_params.parallelism,
            },
            encrypted_seed: sealed.ciphertext,
            mac: Vec::new(),
        };
        wallet_store.save(&new_wallet)?;
        tracing::info!(wallet = %target_name, "restored wallet from backup");
        Ok(())
    }

    fn read_envelope(&self, path: &Path) -> Result<BackupEnvelope, BackupError> {
        let bytes = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BackupError::NotFound(path.display().to_string())
            } else {
                BackupError::Io(e.to_string())
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| BackupError::InvalidFormat(e.to_string()))
    }
}

fn checksum_of(payload: &BackupPayload) -> Result<String, BackupError> {
    let bytes = serde_json::to_vec(payload).map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(bytes)))
}

fn verify_checksum(envelope: &BackupEnvelope) -> Result<(), BackupError> {
    let expected = checksum_of(&envelope.payload())?;
    if expected != envelope.checksum {
        return Err(BackupError::BackupCorrupted);
    }
    Ok(())
}

fn decrypt_payload(envelope: &BackupEnvelope, password: &[u8]) -> Result<BackupPlaintext, BackupError> {
    let salt = hex::decode(&envelope.encrypted_data.salt_hex).map_err(|_| BackupError::InvalidFormat("salt_hex".to_string()))?;
    let nonce_bytes = hex::decode(&envelope.encrypted_data.nonce_hex).map_err(|_| BackupError::InvalidFormat("nonce_hex".to_string()))?;
    let nonce: [u8; sigil_crypto::NONCE_LEN] =
        nonce_bytes.try_into().map_err(|_| BackupError::InvalidFormat("nonce_hex length".to_string()))?;
    let ciphertext = hex::decode(&envelope.encrypted_data.ciphertext_hex).map_err(|_| BackupError::InvalidFormat("ciphertext_hex".to_string()))?;

    let params = sigil_crypto::KdfParams {
        algorithm: envelope.encrypted_data.algorithm.clone(),
        memory_kib: envelope.encrypted_data.memory_kib,
        iterations: envelope.encrypted_data.iterations,
        parallelism: envelope.encrypted_data.parallelism,
    };
    let key = sigil_crypto::derive_key(password, &salt, &params).map_err(|_| BackupError::DecryptionFailed)?;
    let plaintext_bytes = sigil_crypto::open(&key, &nonce, &ciphertext, BACKUP_AAD_CONTEXT.as_bytes())
        .map_err(|_| BackupError::DecryptionFailed)?;
    serde_json::from_slice(&plaintext_bytes).map_err(|e| BackupError::InvalidFormat(e.to_string()))
}

fn derive_wallet_key(password: &[u8], kdf: &sigil_wallet_store::KdfParamsDto) -> Result<[u8; sigil_crypto::KEY_LEN], BackupError> {
    let salt = hex::decode(&kdf.salt_hex).map_err(|_| BackupError::InvalidFormat("wallet salt_hex".to_string()))?;
    let params = sigil_crypto::KdfParams {
        algorithm: kdf.algorithm.clone(),
        memory_kib: kdf.memory_kib,
        iterations: kdf.iterations,
        parallelism: kdf.parallelism,
    };
    sigil_crypto::derive_key(password, &salt, &params).map_err(|_| BackupError::DecryptionFailed)
}

fn decrypt_wallet_seed(
    wallet_key: &[u8; sigil_crypto::KEY_LEN],
    encrypted_seed: &[u8],
) -> Result<Vec<u8>, BackupError> {
    // The wallet file's `encrypted_seed` carries the GCM nonce as its
    // first NONCE_LEN bytes, mirroring how `sigil-agent` lays out its
    // sealed seed file, since `SealedWalletFile` itself has no separate
    // nonce field.
    if encrypted_seed.len() < sigil_crypto::NONCE_LEN {
        return Err(BackupError::DecryptionFailed);
    }
    let (nonce_bytes, ciphertext) = encrypted_seed.split_at(sigil_crypto::NONCE_LEN);
    let nonce: [u8; sigil_crypto::NONCE_LEN] = nonce_bytes.try_into().map_err(|_| BackupError::DecryptionFailed)?;
    sigil_crypto::open(wallet_key, &nonce, ciphertext, SEED_AAD_CONTEXT.as_bytes()).map_err(|_| BackupError::DecryptionFailed)
}

fn write_atomic(path: &Path, envelope: &BackupEnvelope) -> Result<(), BackupError> {
    let bytes = serde_json::to_vec_pretty(envelope).map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BackupError::Io(e.to_string()))?;
    tmp.write_all(&bytes).map_err(|e| BackupError::Io(e.to_string()))?;
    tmp.flush().map_err(|e| BackupError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| BackupError::Io(e.to_string()))?;
    set_owner_only(tmp.path()).map_err(|e| BackupError::Io(e.to_string()))?;
    tmp.persist(path).map_err(|e| BackupError::Io(e.error.to_string()))?;
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
