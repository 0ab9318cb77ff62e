//! Storage resolution and session provisioning for the studio application.
//!
//! Decides whether the NAS or the local cache is the active root, mounts the
//! NAS when possible, creates per-booking session folders and copies cached
//! sessions back to the NAS once it is reachable again.

pub mod commands;
pub mod config;
pub mod error;
pub mod mount;
pub mod service;
pub mod session;
pub mod storage;
pub mod sync;
pub mod utils;

pub use config::{ConfigStore, StoreConfig};
pub use error::StudioError;
pub use service::StudioStorage;
