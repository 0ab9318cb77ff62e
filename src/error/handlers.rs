//! Error handlers
//!
//! Maps errors onto the stable codes callers match on.

use crate::error::types::{MountError, StorageError, StudioError, SyncError};
use log::error;

/// Log a storage core error
pub fn handle_error(err: &StudioError) {
    error!("Storage core error: {}", err);
}

/// Convert error to a caller-facing code
pub fn error_code(err: &StudioError) -> &'static str {
    match err {
        StudioError::Config(_) => "CONFIG_ERROR",
        StudioError::Storage(StorageError::PathResolution(_)) => "PATH_RESOLUTION_FAILED",
        StudioError::Storage(StorageError::DirectoryCreation { .. }) => {
            "DIRECTORY_CREATION_FAILED"
        }
        StudioError::Storage(StorageError::InvalidInput(_)) => "INVALID_INPUT",
        StudioError::Storage(StorageError::SessionNotFound(_))
        | StudioError::Storage(StorageError::FileNotFound(_)) => "NOT_FOUND",
        StudioError::Storage(StorageError::FileAlreadyExists(_)) => "ALREADY_EXISTS",
        StudioError::Storage(StorageError::IoError(_)) => "IO_ERROR",
        StudioError::Mount(MountError::Timeout { .. }) => "MOUNT_TIMEOUT",
        StudioError::Mount(_) => "MOUNT_FAILED",
        StudioError::Sync(SyncError::NasNotAvailable) => "NAS_NOT_AVAILABLE",
        StudioError::Sync(SyncError::IoError(_)) => "IO_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_unavailable_has_dedicated_code() {
        let err = StudioError::from(SyncError::NasNotAvailable);
        assert_eq!(error_code(&err), "NAS_NOT_AVAILABLE");
    }

    #[test]
    fn directory_creation_code() {
        let err = StudioError::from(StorageError::DirectoryCreation {
            path: "/tmp/x".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(error_code(&err), "DIRECTORY_CREATION_FAILED");
    }
}
