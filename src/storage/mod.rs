//! Storage root management
//!
//! Decides whether the NAS or the local cache is the active root and
//! provides the filesystem helpers built on top of it.

pub mod filesystem;
pub mod monitor;
pub mod permissions;
pub mod resolver;
pub mod results;

pub use monitor::ConnectivityMonitor;
pub use resolver::VolumeResolver;
pub use results::{NetworkStatus, StorageRoot};
