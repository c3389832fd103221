//! Per-credential daily spend counter with an exclusive-file-lock
//! read-modify-write cycle.
//!
//! No advisory-lock crate is pulled in for this: a `.lock` sibling file
//! created with `O_EXCL` semantics (`OpenOptions::create_new`) serves as
//! the mutex, retried with a short backoff, and removed when the holder
//! is done. This mirrors the atomic-rewrite idiom used by every other
//! on-disk store in this workspace, just with an extra exclusivity gate
//! around the read-modify-write.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};

use crate::error::AgentError;
use crate::model::DailyCounter;

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(5);
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

struct FileLock {
    path: PathBuf,
}

impl FileLock {
    fn acquire(counter_path: &Path) -> Result<Self, AgentError> {
        let lock_path = counter_path.with_extension("lock");
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            match fs::OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(_) => return Ok(Self { path: lock_path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(AgentError::Io("timed out waiting for counter lock".to_string()));
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(AgentError::Io(e.to_string())),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn read_counter(path: &Path, today: NaiveDate) -> Result<DailyCounter, AgentError> {
    if !path.is_file() {
        return Ok(DailyCounter::zero(today));
    }
    let bytes = fs::read(path).map_err(|e| AgentError::Io(e.to_string()))?;
    let counter: DailyCounter =
        serde_json::from_slice(&bytes).map_err(|e| AgentError::InvalidFormat(e.to_string()))?;
    Ok(counter.rolled_over(today))
}

fn write_counter(path: &Path, counter: &DailyCounter) -> Result<(), AgentError> {
    let bytes = serde_json::to_vec_pretty(counter).map_err(|e| AgentError::InvalidFormat(e.to_string()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| AgentError::Io(e.to_string()))?;
    use std::io::Write;
    tmp.write_all(&bytes).map_err(|e| AgentError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| AgentError::Io(e.to_string()))?;
    tmp.persist(path).map_err(|e| AgentError::Io(e.error.to_string()))?;
    Ok(())
}

/// Returns the counter as of today without acquiring the write lock,
/// rolling over to zero in memory if the recorded day has passed.
pub fn get_daily_spent(path: &Path) -> Result<(u64, String), AgentError> {
    let today = Utc::now().date_naive();
    let counter = read_counter(path, today)?;
    Ok((counter.spent_sat, counter.spent_wei))
}

/// Adds `spent_sat`/`spent_wei` to the counter under an exclusive lock,
/// applying day rollover before the addition. `spent_wei` is accumulated
/// via arbitrary-precision decimal string addition.
pub fn record_spend(path: &Path, spent_sat: u64, spent_wei: &str) -> Result<DailyCounter, AgentError> {
    let _lock = FileLock::acquire(path)?;
    let today = Utc::now().date_naive();
    let mut counter = read_counter(path, today)?;
    counter.spent_sat = counter.spent_sat.saturating_add(spent_sat);
    counter.spent_wei = add_decimal_strings(&counter.spent_wei, spent_wei);
    write_counter(path, &counter)?;
    Ok(counter)
}

/// Adds two non-negative base-10 integer strings without going through a
/// bignum crate for this single hot spot; `sigil-policy` carries
/// `num-bigint` for the policy comparisons themselves.
fn add_decimal_strings(a: &str, b: &str) -> String {
    let a_digits: Vec<u32> = a.bytes().rev().map(|c| (c - b'0') as u32).collect();
    let b_digits: Vec<u32> = b.bytes().rev().map(|c| (c - b'0') as u32).collect();
    let len = a_digits.len().max(b_digits.len());
    let mut out = Vec::with_capacity(len + 1);
    let mut carry = 0u32;
    for i in 0..len {
        let da = a_digits.get(i).copied().unwrap_or(0);
        let db = b_digits.get(i).copied().unwrap_or(0);
        let sum = da + db + carry;
        out.push((sum % 10) as u8 + b'0');
        carry = sum / 10;
    }
    if carry > 0 {
        out.push(carry as u8 + b'0');
    }
    out.reverse();
    String::from_utf8(out).expect("digits are ascii")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_add_basic() {
        assert_eq!(add_decimal_strings("0", "0"), "0");
        assert_eq!(add_decimal_strings("999", "1"), "1000");
        assert_eq!(add_decimal_strings("123456789012345678901234567890", "1"), "123456789012345678901234567891");
    }

    #[test]
    fn fresh_counter_starts_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("counter.json");
        let (sat, wei) = get_daily_spent(&path).unwrap();
        assert_eq!(sat, 0);
        assert_eq!(wei, "0");
    }

    #[test]
    fn record_spend_accumulates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("counter.json");
        record_spend(&path, 1_000, "100").unwrap();
        let counter = record_spend(&path, 2_000, "50").unwrap();
        assert_eq!(counter.spent_sat, 3_000);
        assert_eq!(counter.spent_wei, "150");
    }

    #[test]
    fn day_rollover_resets_in_memory_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("counter.json");
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let stale = DailyCounter { day: yesterday, spent_sat: 999, spent_wei: "999".to_string() };
        write_counter(&path, &stale).unwrap();

        let (sat, wei) = get_daily_spent(&path).unwrap();
        assert_eq!(sat, 0);
        assert_eq!(wei, "0");
    }

    #[test]
    fn lock_is_released_after_record_spend() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("counter.json");
        record_spend(&path, 1, "1").unwrap();
        // A second call must not hang waiting on a stale lock file.
        record_spend(&path, 1, "1").unwrap();
        assert!(!path.with_extension("lock").exists());
    }
}
