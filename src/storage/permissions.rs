//! File permissions
//!
//! Accessibility checks used to decide whether a storage root is usable.
//!
//! [`is_accessible`] only inspects permission bits. A network share whose ACLs
//! disagree with the bits it reports can pass this check and still reject the
//! first real write; [`probe_writable`] performs an actual write for callers
//! that need certainty.

use log::debug;
use std::path::Path;

/// Check if the directory's read bits are set
pub fn is_readable(meta: &std::fs::Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o444 != 0
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        true
    }
}

/// Check if any write bit is set
pub fn is_writable(meta: &std::fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

/// Path exists, is a directory, and carries read and write permission bits
pub async fn is_accessible(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_dir() && is_readable(&meta) && is_writable(&meta),
        Err(e) => {
            debug!("{} not accessible: {}", path.display(), e);
            false
        }
    }
}

/// Create and remove a marker file to prove the directory takes writes
pub async fn probe_writable(path: &Path) -> bool {
    if !is_accessible(path).await {
        return false;
    }
    let marker = path.join(format!(".studio-write-probe-{}", std::process::id()));
    match tokio::fs::write(&marker, b"probe").await {
        Ok(()) => {
            if let Err(e) = tokio::fs::remove_file(&marker).await {
                debug!("Failed to remove probe {}: {}", marker.display(), e);
            }
            true
        }
        Err(e) => {
            debug!("Write probe failed in {}: {}", path.display(), e);
            false
        }
    }
}
