//! Session result types
//!
//! Defines result structures returned by session provisioning and lookups.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::session::naming::Subfolder;
use crate::storage::StorageRoot;

/// Paths of a provisioned session
#[derive(Debug, Clone, Serialize)]
pub struct SessionPaths {
    pub root: PathBuf,
    pub raw: PathBuf,
    pub selected: PathBuf,
    pub edited: PathBuf,
    #[serde(rename = "final")]
    pub final_: PathBuf,
    pub folder_name: String,
    pub storage: StorageRoot,
}

impl SessionPaths {
    pub fn new(root: PathBuf, folder_name: String, storage: StorageRoot) -> Self {
        Self {
            raw: root.join(Subfolder::Raw.dir_name()),
            selected: root.join(Subfolder::Selected.dir_name()),
            edited: root.join(Subfolder::Edited.dir_name()),
            final_: root.join(Subfolder::Final.dir_name()),
            root,
            folder_name,
            storage,
        }
    }

    pub fn subfolder(&self, folder: Subfolder) -> &Path {
        match folder {
            Subfolder::Raw => &self.raw,
            Subfolder::Selected => &self.selected,
            Subfolder::Edited => &self.edited,
            Subfolder::Final => &self.final_,
        }
    }
}

/// Where an existing session was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionLocation {
    pub path: PathBuf,
    pub storage: StorageRoot,
}

/// Media file counts per subfolder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderStats {
    pub raw: usize,
    pub selected: usize,
    pub edited: usize,
    #[serde(rename = "final")]
    pub final_: usize,
}

impl FolderStats {
    pub fn total(&self) -> usize {
        self.raw + self.selected + self.edited + self.final_
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    Copy,
    Move,
}

/// A per-file failure that did not stop the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Result of moving or copying files between subfolders
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferResult {
    pub transferred: Vec<String>,
    pub errors: Vec<FileError>,
}
