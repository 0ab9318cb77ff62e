//! Storage service
//!
//! The explicit service object, its background sync watcher and the
//! response shape handed to callers.

pub mod core;
pub mod response;
pub mod watcher;

pub use self::core::StudioStorage;
pub use response::Response;
pub use watcher::SyncWatcher;
