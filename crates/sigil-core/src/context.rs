//! The single explicit value threaded through every entry point, replacing
//! the package-level globals (config, formatter, session manager) the
//! original source used.

use std::fs;
use std::path::{Path, PathBuf};

use sigil_agent::AgentStore;
use sigil_backup::BackupManager;
use sigil_cache::BalanceCache;
use sigil_config::ConfigStore;
use sigil_session::SessionManager;
use sigil_wallet_store::WalletStore;

use crate::client::ChainClients;
use crate::error::SigilError;

const SUBDIRS: &[&str] = &["wallets", "cache", "sessions", "agents", "backups"];

/// Everything a command needs, constructed once at startup.
pub struct Context {
    pub home_dir: PathBuf,
    pub config: ConfigStore,
    pub logger: tracing::Span,
    pub storage: WalletStore,
    pub cache: BalanceCache,
    pub session_mgr: SessionManager,
    pub agent_store: AgentStore,
    pub backups: BackupManager,
    pub chain_clients: ChainClients,
}

impl Context {
    /// Resolves `<home_dir>` (e.g. `~/.sigil`), creates it and its
    /// subdirectories with owner-only permissions if they don't already
    /// exist, and opens every sub-store rooted there.
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, SigilError> {
        let home_dir = home_dir.as_ref().to_path_buf();
        fs::create_dir_all(&home_dir).map_err(|e| SigilError::Internal(e.to_string()))?;
        set_owner_only(&home_dir).map_err(|e| SigilError::Internal(e.to_string()))?;
        for name in SUBDIRS {
            let dir = home_dir.join(name);
            fs::create_dir_all(&dir).map_err(|e| SigilError::Internal(e.to_string()))?;
            set_owner_only(&dir).map_err(|e| SigilError::Internal(e.to_string()))?;
        }

        let logger = tracing::info_span!("sigil_context", home = %home_dir.display());
        let _guard = logger.enter();
        tracing::info!("opened context");
        drop(_guard);

        Ok(Self {
            config: ConfigStore::open(&home_dir)?,
            storage: WalletStore::open(&home_dir)?,
            cache: BalanceCache::open(&home_dir)?,
            session_mgr: SessionManager::open(&home_dir)?,
            agent_store: AgentStore::open(&home_dir)?,
            backups: BackupManager::open(&home_dir)?,
            chain_clients: ChainClients::default(),
            logger,
            home_dir,
        })
    }

    /// Resolves the default `~/.sigil` home directory and opens a
    /// `Context` rooted there.
    pub fn open_default() -> Result<Self, SigilError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SigilError::Internal("could not resolve the user's home directory".to_string()))?
            .join(".sigil");
        Self::open(home)
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
