//! Network volume resolution
//!
//! Picks the first accessible candidate among the primary mount path,
//! a previously discovered path, and the configured alternatives.

use log::debug;
use std::path::PathBuf;

use crate::config::NasConfig;
use crate::storage::permissions::{is_accessible, probe_writable};

/// Ordered list of places the NAS may be mounted
#[derive(Debug, Clone)]
pub struct VolumeResolver {
    candidates: Vec<PathBuf>,
    verify_write: bool,
}

impl VolumeResolver {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            verify_write: false,
        }
    }

    /// Primary path first, then the discovered path, then alternatives.
    /// A configured subfolder is appended to every candidate.
    pub fn from_config(nas: &NasConfig) -> Self {
        let mut candidates = vec![nas.primary_path()];
        if let Some(found) = &nas.discovered_path {
            candidates.push(found.clone());
        }
        candidates.extend(nas.alternative_paths.iter().cloned());

        if let Some(sub) = nas.subfolder.as_deref().filter(|s| !s.is_empty()) {
            candidates = candidates
                .into_iter()
                .map(|c| if c.ends_with(sub) { c } else { c.join(sub) })
                .collect();
        }

        let mut seen = Vec::with_capacity(candidates.len());
        for c in candidates {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }

        Self {
            candidates: seen,
            verify_write: nas.verify_write_access,
        }
    }

    pub fn with_write_probe(mut self, enabled: bool) -> Self {
        self.verify_write = enabled;
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First accessible candidate, or `None` when the cache should be used
    pub async fn resolve_root(&self) -> Option<PathBuf> {
        for candidate in &self.candidates {
            let ok = if self.verify_write {
                probe_writable(candidate).await
            } else {
                is_accessible(candidate).await
            };
            if ok {
                debug!("NAS resolved at {}", candidate.display());
                return Some(candidate.clone());
            }
        }
        debug!("NAS not found in {} candidates", self.candidates.len());
        None
    }
}
