//! Backup envelope schema: plaintext manifest, encrypted payload, checksum.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sigil_wallet_store::ChainId;

pub const CURRENT_BACKUP_VERSION: u32 = 1;
pub const ENCRYPTION_METHOD: &str = "aes-256-gcm+argon2id";

/// Public, unencrypted summary of a backup's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub wallet_name: String,
    pub created_at: DateTime<Utc>,
    pub chains: Vec<ChainId>,
    pub address_counts: BTreeMap<ChainId, usize>,
    pub encryption_method: String,
}

/// The sealed inner blob: KDF params, nonce, and ciphertext for the
/// `(seed, metadata)` pair. Treated as opaque by everything except
/// `create`/`restore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedData {
    pub algorithm: String,
    pub salt_hex: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub nonce_hex: String,
    pub ciphertext_hex: String,
}

/// What `EncryptedData` decrypts to: the raw seed plus enough metadata to
/// reconstruct the wallet on restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPlaintext {
    pub seed_hex: String,
    pub metadata: sigil_wallet_store::WalletMetadata,
}

/// The on-disk `.sigil` backup file, minus its own `checksum` field —
/// this is exactly what gets hashed to produce that field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPayload {
    pub version: u32,
    pub manifest: BackupManifest,
    pub encrypted_data: EncryptedData,
}

/// The full on-disk `.sigil` backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEnvelope {
    pub version: u32,
    pub manifest: BackupManifest,
    pub encrypted_data: EncryptedData,
    pub checksum: String,
}

impl BackupEnvelope {
    pub fn payload(&self) -> BackupPayload {
        BackupPayload {
            version: self.version,
            manifest: self.manifest.clone(),
            encrypted_data: self.encrypted_data.clone(),
        }
    }
}
