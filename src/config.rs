//! Configuration management for the studio storage core
//!
//! The persisted settings live in a single JSON document. It is read once at
//! startup and rewritten on every mutation through [`ConfigStore::update`].
//! `STUDIO_STORAGE__*` environment overrides are layered on top in memory only;
//! they are never written back to the file.
//!
//! A stored file whose `version` is older than [`CONFIG_VERSION`], that fails to
//! parse, or that fails validation on its own is deleted and replaced with defaults. No
//! field is carried over: a version bump discards every saved setting, including
//! credentials and a discovered NAS path.

use config::{Config, Environment, File, FileFormat};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::ConfigError;

/// Bump when the persisted layout changes. Older files are reset, not migrated.
pub const CONFIG_VERSION: u32 = 3;

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "STUDIO_STORAGE_CONFIG";

const ENV_PREFIX: &str = "STUDIO_STORAGE";
const APP_DIR: &str = "studio-storage";
const CONFIG_FILE: &str = "config.json";

/// Network volume settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NasConfig {
    /// Host name or IP address of the NAS
    pub host: String,

    /// Share exported by the NAS
    pub share: String,

    /// Folder inside the share that acts as the storage root
    pub subfolder: Option<String>,

    /// Replaces the platform default primary mount path
    pub primary_path: Option<PathBuf>,

    /// Checked in order after the primary path
    pub alternative_paths: Vec<PathBuf>,

    /// Where auto-mount is allowed to attach the share
    pub mount_points: Vec<PathBuf>,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Tried (without password) after the configured user
    pub alternative_users: Vec<String>,

    /// Last path auto-mount found working
    pub discovered_path: Option<PathBuf>,

    pub auto_mount_on_startup: bool,

    /// Probe with a real file write instead of trusting permission bits
    pub verify_write_access: bool,

    pub mount_timeout_secs: u64,

    /// How long a connectivity probe result is reused
    pub status_ttl_secs: u64,
}

/// Local fallback cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,

    /// Upper bound on concurrent folder traversals
    pub max_concurrent_scans: usize,
}

/// Cache-to-NAS reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Reconcile every cached session when the NAS comes back
    pub auto_sync: bool,

    /// Connectivity poll interval of the sync watcher
    pub interval_secs: u64,
}

/// Complete persisted configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Missing in a stored file means "older than any release"
    #[serde(default)]
    pub version: u32,

    pub nas: NasConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
}

impl Default for NasConfig {
    fn default() -> Self {
        let host = "192.168.1.100".to_string();
        let share = "StudioPhotos".to_string();
        Self {
            alternative_paths: default_alternative_paths(&host, &share),
            mount_points: default_mount_points(&share),
            host,
            share,
            subfolder: None,
            primary_path: None,
            username: Some("studio".to_string()),
            password: None,
            alternative_users: vec!["admin".to_string()],
            discovered_path: None,
            auto_mount_on_startup: true,
            verify_write_access: false,
            mount_timeout_secs: 15,
            status_ttl_secs: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            path: base.join(APP_DIR).join("cache"),
            max_concurrent_scans: 8,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: true,
            interval_secs: 60,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            nas: NasConfig::default(),
            cache: CacheConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl NasConfig {
    /// Configured primary path, or the platform's usual mount location
    pub fn primary_path(&self) -> PathBuf {
        self.primary_path
            .clone()
            .unwrap_or_else(|| platform_primary_path(&self.host, &self.share))
    }

    /// Address of the share as the platform's native connection flow expects it
    pub fn share_address(&self) -> String {
        if cfg!(windows) {
            format!("\\\\{}\\{}", self.host, self.share)
        } else {
            format!("smb://{}/{}", self.host, self.share)
        }
    }

    pub fn mount_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.mount_timeout_secs)
    }

    pub fn status_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.status_ttl_secs)
    }
}

impl StoreConfig {
    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.nas.host.trim().is_empty() {
            return Err(config::ConfigError::Message("nas.host cannot be empty".into()));
        }

        if self.nas.share.trim().is_empty() || self.nas.share.contains(['/', '\\']) {
            return Err(config::ConfigError::Message(
                "nas.share must be a plain share name".into(),
            ));
        }

        if self.nas.mount_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "nas.mount_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.cache.path.as_os_str().is_empty() {
            return Err(config::ConfigError::Message(
                "cache.path cannot be empty".into(),
            ));
        }

        if self.cache.max_concurrent_scans == 0 {
            return Err(config::ConfigError::Message(
                "cache.max_concurrent_scans must be greater than 0".into(),
            ));
        }

        if self.sync.interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "sync.interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

fn platform_primary_path(host: &str, share: &str) -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Volumes").join(share)
    } else if cfg!(windows) {
        PathBuf::from(format!("\\\\{}\\{}", host, share))
    } else {
        PathBuf::from("/mnt").join(share)
    }
}

fn default_alternative_paths(host: &str, share: &str) -> Vec<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Volumes").join(format!("{}-1", share)),
            PathBuf::from("/Volumes").join(share.to_lowercase()),
            home.join("mnt").join(share),
        ]
    } else if cfg!(windows) {
        vec![PathBuf::from("Z:\\"), PathBuf::from("Y:\\")]
    } else {
        vec![
            PathBuf::from("/media").join(share),
            PathBuf::from("/mnt/nas"),
            home.join("mnt").join(share),
            PathBuf::from(format!(
                "/run/user/1000/gvfs/smb-share:server={},share={}",
                host,
                share.to_lowercase()
            )),
        ]
    }
}

fn default_mount_points(share: &str) -> Vec<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Volumes").join(share),
            home.join("mnt").join(share),
        ]
    } else if cfg!(windows) {
        vec![PathBuf::from("Z:"), PathBuf::from("Y:"), PathBuf::from("X:")]
    } else {
        vec![PathBuf::from("/mnt").join(share), home.join("mnt").join(share)]
    }
}

/// Persisted configuration shared by every component
#[derive(Debug)]
struct Layers {
    /// What config.json holds; the only layer ever written back
    stored: StoreConfig,
    /// `stored` with environment overrides applied
    effective: StoreConfig,
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    layers: RwLock<Layers>,
}

impl ConfigStore {
    /// `$STUDIO_STORAGE_CONFIG`, else `<config dir>/studio-storage/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Self::default_path()?)
    }

    /// Load the config file, resetting it to defaults when the file itself is
    /// missing, malformed, invalid or from an older version. Environment
    /// overrides are applied afterwards; a bad override is an error and never
    /// touches the file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        let stored = if !path.exists() {
            info!("No config at {}, writing defaults", path.display());
            write_config(&path, &StoreConfig::default())?;
            StoreConfig::default()
        } else {
            match read_file(&path) {
                Ok(stored) if stored.version < CONFIG_VERSION => {
                    warn!(
                        "Config version {} is older than {}, resetting {} to defaults",
                        stored.version,
                        CONFIG_VERSION,
                        path.display()
                    );
                    reset_file(&path)?
                }
                Ok(stored) => match stored.validate() {
                    Ok(()) => stored,
                    Err(e) => {
                        warn!("Invalid config {}: {}. Resetting to defaults", path.display(), e);
                        reset_file(&path)?
                    }
                },
                Err(e) => {
                    warn!("Malformed config {}: {}. Resetting to defaults", path.display(), e);
                    reset_file(&path)?
                }
            }
        };

        let effective = with_env_overrides(&stored)?;

        debug!("Loaded config from {}", path.display());
        Ok(Self {
            path,
            layers: RwLock::new(Layers { stored, effective }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the configuration in effect, environment overrides included
    pub async fn snapshot(&self) -> StoreConfig {
        self.layers.read().await.effective.clone()
    }

    /// Apply a mutation to the stored settings, validate it and rewrite the file.
    /// Environment overrides are re-applied in memory but never persisted.
    /// An invalid result is rejected and leaves both memory and disk untouched.
    pub async fn update<F>(&self, mutate: F) -> Result<StoreConfig, ConfigError>
    where
        F: FnOnce(&mut StoreConfig),
    {
        let mut layers = self.layers.write().await;
        let mut stored = layers.stored.clone();
        mutate(&mut stored);
        stored.version = CONFIG_VERSION;
        stored.validate()?;
        let effective = with_env_overrides(&stored)?;

        persist(&self.path, &stored).await?;
        *layers = Layers {
            stored,
            effective: effective.clone(),
        };
        info!("Config saved to {}", self.path.display());
        Ok(effective)
    }

    /// Discard every stored setting
    pub async fn reset(&self) -> Result<StoreConfig, ConfigError> {
        let mut layers = self.layers.write().await;
        let stored = StoreConfig::default();
        let effective = with_env_overrides(&stored)?;
        persist(&self.path, &stored).await?;
        *layers = Layers {
            stored,
            effective: effective.clone(),
        };
        warn!("Config reset to defaults at {}", self.path.display());
        Ok(effective)
    }
}

/// The file alone, no environment
fn read_file(path: &Path) -> Result<StoreConfig, config::ConfigError> {
    Config::builder()
        .add_source(File::from(path).format(FileFormat::Json).required(true))
        .build()?
        .try_deserialize()
}

/// Layer `STUDIO_STORAGE__*` variables over `stored` and validate the result
fn with_env_overrides(stored: &StoreConfig) -> Result<StoreConfig, ConfigError> {
    let base = serde_json::to_string(stored)?;
    let effective: StoreConfig = Config::builder()
        .add_source(File::from_str(&base, FileFormat::Json))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;
    effective.validate()?;
    Ok(effective)
}

fn reset_file(path: &Path) -> Result<StoreConfig, ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    let defaults = StoreConfig::default();
    write_config(path, &defaults)?;
    Ok(defaults)
}

fn write_config(path: &Path, cfg: &StoreConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(cfg)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, body)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

async fn persist(path: &Path, cfg: &StoreConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(cfg)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn share_with_separator_is_rejected() {
        let mut cfg = StoreConfig::default();
        cfg.nas.share = "photos/2026".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn primary_path_override_wins() {
        let mut nas = NasConfig::default();
        nas.primary_path = Some(PathBuf::from("/srv/photos"));
        assert_eq!(nas.primary_path(), PathBuf::from("/srv/photos"));
    }
}
