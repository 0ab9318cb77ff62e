//! Session directories
//!
//! Deterministic per-booking folder trees:
//! `{root}/{YYYY}/{MM}/{YYYY-MM-DD}_{name}/{01_RAW|02_SELECTED|03_EDITED|04_FINAL}`.

pub mod booking;
pub mod naming;
pub mod provisioner;
pub mod results;

pub use booking::{BookingDetails, WeddingDetails};
pub use naming::{SessionKey, Subfolder, sanitize_name};
pub use provisioner::DirectoryProvisioner;
pub use results::{
    FileError, FolderStats, SessionLocation, SessionPaths, TransferMode, TransferResult,
};
