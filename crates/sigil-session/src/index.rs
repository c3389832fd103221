//! The disk-adjacent index of session metadata (never seed bytes).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub wallet: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    sessions: BTreeMap<String, SessionRecord>,
}

/// Guards the on-disk session index. Reads and rewrites happen under a
/// process-local lock (see `SessionManager`); the file itself is always
/// rewritten atomically so concurrent processes never observe a torn
/// write.
pub struct SessionIndex {
    path: PathBuf,
}

impl SessionIndex {
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        let dir = home_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| SessionError::Io(e.to_string()))?;
        Ok(Self { path: dir.join("sessions.json") })
    }

    fn read(&self) -> Result<IndexFile, SessionError> {
        if !self.path.is_file() {
            return Ok(IndexFile::default());
        }
        let bytes = std::fs::read(&self.path).map_err(|e| SessionError::Io(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(IndexFile::default());
        }
        serde_json::from_slice(&bytes).map_err(|e| SessionError::InvalidFormat(e.to_string()))
    }

    fn write(&self, index: &IndexFile) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec_pretty(index).map_err(|e| SessionError::InvalidFormat(e.to_string()))?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.flush().map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.as_file().sync_all().map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.persist(&self.path).map_err(|e| SessionError::Io(e.error.to_string()))?;
        Ok(())
    }

    pub fn get(&self, wallet: &str) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.read()?.sessions.get(wallet).cloned())
    }

    pub fn list(&self) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(self.read()?.sessions.into_values().collect())
    }

    pub fn upsert(&self, record: SessionRecord) -> Result<(), SessionError> {
        let mut index = self.read()?;
        index.sessions.insert(record.wallet.clone(), record);
        self.write(&index)
    }

    /// Removes one session. Returns whether an entry existed.
    pub fn remove(&self, wallet: &str) -> Result<bool, SessionError> {
        let mut index = self.read()?;
        let existed = index.sessions.remove(wallet).is_some();
        self.write(&index)?;
        Ok(existed)
    }

    /// Removes every session, returning how many existed.
    pub fn clear(&self) -> Result<Vec<String>, SessionError> {
        let mut index = self.read()?;
        let names: Vec<String> = index.sessions.keys().cloned().collect();
        index.sessions.clear();
        self.write(&index)?;
        Ok(names)
    }
}
