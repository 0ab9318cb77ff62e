//! Error types
//!
//! Defines domain-specific error types for each module of the storage core.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration store errors
#[derive(Debug)]
pub enum ConfigError {
    Load(config::ConfigError),
    Serialize(serde_json::Error),
    IoError(io::Error),
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(e) => write!(f, "Failed to load config: {}", e),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::IoError(e) => write!(f, "Config I/O error: {}", e),
            ConfigError::NoConfigDir => write!(f, "No application data directory available"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(error: config::ConfigError) -> Self {
        ConfigError::Load(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Serialize(error)
    }
}

impl From<io::Error> for ConfigError {
    fn from(error: io::Error) -> Self {
        ConfigError::IoError(error)
    }
}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    PathResolution(String),
    DirectoryCreation { path: PathBuf, source: io::Error },
    InvalidInput(String),
    SessionNotFound(String),
    FileNotFound(String),
    FileAlreadyExists(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PathResolution(msg) => write!(f, "Storage not available: {}", msg),
            StorageError::DirectoryCreation { path, source } => {
                write!(f, "Failed to create {}: {}", path.display(), source)
            }
            StorageError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            StorageError::SessionNotFound(name) => write!(f, "Session not found: {}", name),
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::FileAlreadyExists(p) => write!(f, "File already exists: {}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Mount module errors
#[derive(Debug)]
pub enum MountError {
    Spawn { program: String, source: io::Error },
    Timeout { program: String, after: Duration },
    CommandFailed { program: String, code: i32, stderr: String },
    NotAccessible(PathBuf),
    CredentialsFile(io::Error),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::Spawn { program, source } => {
                write!(f, "Failed to run {}: {}", program, source)
            }
            MountError::Timeout { program, after } => {
                write!(f, "{} timed out after {}s", program, after.as_secs())
            }
            MountError::CommandFailed {
                program,
                code,
                stderr,
            } => write!(f, "{} exited with {}: {}", program, code, stderr.trim()),
            MountError::NotAccessible(p) => {
                write!(f, "Mounted but not accessible: {}", p.display())
            }
            MountError::CredentialsFile(e) => {
                write!(f, "Failed to write mount credentials: {}", e)
            }
        }
    }
}

impl std::error::Error for MountError {}

/// Sync module errors
#[derive(Debug)]
pub enum SyncError {
    NasNotAvailable,
    IoError(io::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NasNotAvailable => write!(f, "NAS is not available"),
            SyncError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<io::Error> for SyncError {
    fn from(error: io::Error) -> Self {
        SyncError::IoError(error)
    }
}

/// General error that encompasses all error types
#[derive(Debug)]
pub enum StudioError {
    Config(ConfigError),
    Storage(StorageError),
    Mount(MountError),
    Sync(SyncError),
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::Config(e) => write!(f, "Config error: {}", e),
            StudioError::Storage(e) => write!(f, "Storage error: {}", e),
            StudioError::Mount(e) => write!(f, "Mount error: {}", e),
            StudioError::Sync(e) => write!(f, "Sync error: {}", e),
        }
    }
}

impl std::error::Error for StudioError {}

impl From<ConfigError> for StudioError {
    fn from(error: ConfigError) -> Self {
        StudioError::Config(error)
    }
}

impl From<StorageError> for StudioError {
    fn from(error: StorageError) -> Self {
        StudioError::Storage(error)
    }
}

impl From<MountError> for StudioError {
    fn from(error: MountError) -> Self {
        StudioError::Mount(error)
    }
}

impl From<SyncError> for StudioError {
    fn from(error: SyncError) -> Self {
        StudioError::Sync(error)
    }
}
