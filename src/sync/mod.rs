//! Cache to NAS reconciliation

mod operations;
pub mod results;

pub use operations::CacheSyncReconciler;
pub use results::{CacheStatus, SyncResult};
