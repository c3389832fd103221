//! Typed hierarchical settings: defaults, a TOML file under
//! `~/.sigil/config.toml`, and `SIGIL__`-prefixed environment overrides,
//! layered with the `config` crate. Also supports a dotted-path `get`/`set`
//! so a caller can tweak one field (e.g. `discovery.gap_limit`) without
//! rewriting the whole file by hand.

pub mod error;
pub mod model;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use model::{CacheConfig, CryptoConfig, DiscoveryConfig, SessionConfig, SigilConfig};

const ENV_PREFIX: &str = "SIGIL";

pub struct ConfigStore {
    path: PathBuf,
    config: SigilConfig,
}

impl ConfigStore {
    /// Loads `<home_dir>/config.toml`, layering hardcoded defaults under
    /// the file's contents under `SIGIL__SECTION__FIELD` environment
    /// overrides. Missing file is not an error — defaults apply.
    pub fn open(home_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = home_dir.as_ref().join("config.toml");

        let defaults_toml = toml::to_string(&SigilConfig::default())
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let builder = config::Config::builder()
            .add_source(config::File::from_str(&defaults_toml, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let layered = builder.build().map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let config: SigilConfig = layered
            .try_deserialize()
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        Ok(Self { path, config })
    }

    pub fn get_config(&self) -> &SigilConfig {
        &self.config
    }

    /// Reads a dotted path like `discovery.gap_limit`, returning its TOML
    /// scalar rendering (e.g. `"20"`, `"true"`).
    pub fn get(&self, dotted_path: &str) -> Result<String, ConfigError> {
        let value = toml::Value::try_from(&self.config).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let found = navigate(&value, dotted_path)?;
        Ok(render_scalar(found))
    }

    /// Sets a dotted path to a new scalar value, persisting the whole
    /// config to `<home>/config.toml` atomically. The existing value at
    /// that path determines how `raw_value` is parsed (int, float, bool,
    /// or string).
    pub fn set(&mut self, dotted_path: &str, raw_value: &str) -> Result<(), ConfigError> {
        let mut value = toml::Value::try_from(&self.config).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        {
            let existing = navigate(&value, dotted_path)?.clone();
            let parsed = parse_like(&existing, raw_value)?;
            *navigate_mut(&mut value, dotted_path)? = parsed;
        }
        let updated: SigilConfig = value.try_into().map_err(|e: toml::de::Error| ConfigError::InvalidFormat(e.to_string()))?;
        self.config = updated;
        self.save()
    }

    fn save(&self) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(&self.config).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        write_atomic(&self.path, text.as_bytes())
    }
}

fn navigate<'a>(value: &'a toml::Value, dotted_path: &str) -> Result<&'a toml::Value, ConfigError> {
    let mut current = value;
    for segment in dotted_path.split('.') {
        current = current
            .get(segment)
            .ok_or_else(|| ConfigError::UnknownKey(dotted_path.to_string()))?;
    }
    Ok(current)
}

fn navigate_mut<'a>(value: &'a mut toml::Value, dotted_path: &str) -> Result<&'a mut toml::Value, ConfigError> {
    let mut current = value;
    let segments: Vec<&str> = dotted_path.split('.').collect();
    for segment in segments {
        current = current
            .get_mut(segment)
            .ok_or_else(|| ConfigError::UnknownKey(dotted_path.to_string()))?;
    }
    Ok(current)
}

fn render_scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_like(existing: &toml::Value, raw: &str) -> Result<toml::Value, ConfigError> {
    let bad = || ConfigError::InvalidFormat(format!("cannot parse '{raw}' as the expected type"));
    Ok(match existing {
        toml::Value::Integer(_) => toml::Value::Integer(raw.parse::<i64>().map_err(|_| bad())?),
        toml::Value::Float(_) => toml::Value::Float(raw.parse::<f64>().map_err(|_| bad())?),
        toml::Value::Boolean(_) => toml::Value::Boolean(raw.parse::<bool>().map_err(|_| bad())?),
        toml::Value::String(_) => toml::Value::String(raw.to_string()),
        _ => return Err(ConfigError::InvalidFormat("unsupported field type for set()".to_string())),
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConfigError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
    tmp.write_all(bytes).map_err(|e| ConfigError::Io(e.to_string()))?;
    tmp.flush().map_err(|e| ConfigError::Io(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| ConfigError::Io(e.to_string()))?;
    set_owner_only(tmp.path()).map_err(|e| ConfigError::Io(e.to_string()))?;
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error.to_string()))?;
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
