//! OS-keyring-backed cache for unlocked wallet seeds.
//!
//! A session stores a wallet's decrypted seed in the platform keyring
//! (Secret Service on Linux) under a namespaced account, so the wallet
//! doesn't need to be re-decrypted with the password on every operation
//! within a TTL window. Only metadata (timestamps) ever touches disk;
//! seed bytes never leave the keyring.

pub mod error;
pub mod index;

pub use error::SessionError;
pub use index::SessionRecord;

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use index::SessionIndex;
use keyring::Entry;
use parking_lot::Mutex;

const SERVICE: &str = "sigil";

fn account_for(wallet: &str) -> String {
    format!("session:{wallet}")
}

pub struct SessionManager {
    index: Mutex<SessionIndex>,
}

impl SessionManager {
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        Ok(Self { index: Mutex::new(SessionIndex::open(home_dir.as_ref())?) })
    }

    /// True iff an OS keyring is reachable: attempts a throwaway
    /// set/get/delete round trip under a private probe account.
    pub fn available(&self) -> bool {
        let probe = match Entry::new(SERVICE, "sigil-keyring-probe") {
            Ok(entry) => entry,
            Err(_) => return false,
        };
        if probe.set_password("probe").is_err() {
            return false;
        }
        let ok = probe.get_password().is_ok();
        let _ = probe.delete_password();
        ok
    }

    /// Stores `seed` in the keyring under a namespaced key and records
    /// session metadata. Overwrites a prior session for the same wallet.
    pub fn start(&self, wallet: &str, seed: &[u8], ttl: Duration) -> Result<(), SessionError> {
        let entry = Entry::new(SERVICE, &account_for(wallet)).map_err(|_| SessionError::KeyringUnavailable)?;
        entry
            .set_password(&BASE64.encode(seed))
            .map_err(|_| SessionError::KeyringUnavailable)?;

        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        let record = SessionRecord { wallet: wallet.to_string(), created_at: now, expires_at };

        let index = self.index.lock();
        index.upsert(record)?;
        tracing::info!(wallet, "started session");
        Ok(())
    }

    /// Returns the cached seed bytes and session metadata if present and
    /// unexpired. Both "no session" and "expired session" are reported
    /// distinctly; callers typically treat them the same way.
    pub fn get(&self, wallet: &str) -> Result<(Vec<u8>, SessionRecord), SessionError> {
        let record = {
            let index = self.index.lock();
            index.get(wallet)?.ok_or_else(|| SessionError::NotFound(wallet.to_string()))?
        };
        if record.is_expired(Utc::now()) {
            return Err(SessionError::Expired(wallet.to_string()));
        }
        let entry = Entry::new(SERVICE, &account_for(wallet)).map_err(|_| SessionError::KeyringUnavailable)?;
        let encoded = entry.get_password().map_err(|_| SessionError::NotFound(wallet.to_string()))?;
        let seed = BASE64
            .decode(&encoded)
            .map_err(|_| SessionError::NotFound(wallet.to_string()))?;
        Ok((seed, record))
    }

    /// Non-mutating validity probe: true iff a session exists and has
    /// not expired. Never touches the keyring.
    pub fn has_valid(&self, wallet: &str) -> bool {
        let index = self.index.lock();
        match index.get(wallet) {
            Ok(Some(record)) => !record.is_expired(Utc::now()),
            _ => false,
        }
    }

    /// Removes one session. Idempotent: returns `Ok(())` even if no
    /// session existed.
    pub fn end(&self, wallet: &str) -> Result<(), SessionError> {
        if let Ok(entry) = Entry::new(SERVICE, &account_for(wallet)) {
            let _ = entry.delete_password();
        }
        let index = self.index.lock();
        index.remove(wallet)?;
        tracing::info!(wallet, "ended session");
        Ok(())
    }

    /// Removes every session, returning how many existed.
    pub fn end_all(&self) -> Result<usize, SessionError> {
        let names = {
            let index = self.index.lock();
            index.clear()?
        };
        for name in &names {
            if let Ok(entry) = Entry::new(SERVICE, &account_for(name)) {
                let _ = entry.delete_password();
            }
        }
        tracing::info!(count = names.len(), "ended all sessions");
        Ok(names.len())
    }

    /// Metadata for every recorded session, expired or not. Never
    /// exposes seed bytes.
    pub fn list(&self) -> Result<Vec<SessionRecord>, SessionError> {
        let index = self.index.lock();
        index.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (SessionManager, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        (SessionManager::open(tmp.path()).unwrap(), tmp)
    }

    // These tests require a reachable OS keyring (Secret Service on
    // Linux); they no-op gracefully when one isn't available so the
    // suite stays green in minimal CI/test containers.

    #[test]
    fn start_and_get_roundtrip() {
        let (mgr, _tmp) = manager();
        if !mgr.available() {
            return;
        }
        mgr.start("alpha", b"seed-bytes", Duration::from_secs(3600)).unwrap();
        let (seed, record) = mgr.get("alpha").unwrap();
        assert_eq!(seed, b"seed-bytes");
        assert_eq!(record.wallet, "alpha");
        assert!(mgr.has_valid("alpha"));
    }

    #[test]
    fn get_missing_session_not_found() {
        let (mgr, _tmp) = manager();
        let err = mgr.get("nope").unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
        assert!(!mgr.has_valid("nope"));
    }

    #[test]
    fn expired_session_reported_as_expired() {
        let (mgr, _tmp) = manager();
        if !mgr.available() {
            return;
        }
        mgr.start("alpha", b"seed-bytes", Duration::from_secs(0)).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        let err = mgr.get("alpha").unwrap_err();
        assert!(matches!(err, SessionError::Expired(_)));
        assert!(!mgr.has_valid("alpha"));
    }

    #[test]
    fn end_is_idempotent() {
        let (mgr, _tmp) = manager();
        mgr.end("never-started").unwrap();
        mgr.end("never-started").unwrap();
    }

    #[test]
    fn end_all_clears_every_session() {
        let (mgr, _tmp) = manager();
        if !mgr.available() {
            return;
        }
        mgr.start("alpha", b"seed-a", Duration::from_secs(3600)).unwrap();
        mgr.start("beta", b"seed-b", Duration::from_secs(3600)).unwrap();
        let count = mgr.end_all().unwrap();
        assert_eq!(count, 2);
        assert!(mgr.list().unwrap().is_empty());
    }
}
