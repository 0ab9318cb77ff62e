//! NAS mounting
//!
//! Detection, native connection requests and the startup auto-mount search.

pub mod backend;
pub mod candidates;
mod operations;
pub mod results;

pub use backend::{MountBackend, platform_backend};
pub use candidates::{Credentials, MountAttempt, ShareCandidate, mount_attempts, share_candidates};
pub use operations::AutoMounter;
pub use results::{DetectResult, MountEntry, MountReport};
