//! Command line parsing
//!
//! One subcommand per operation the storage core exposes.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::session::Subfolder;

#[derive(Debug, Parser)]
#[command(name = "studio-storage", version, about = "NAS / local cache storage core")]
pub struct Cli {
    /// Config file (default: $STUDIO_STORAGE_CONFIG or the app config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Identifies a session folder
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    pub client: String,
    pub session_id: String,
    /// YYYY-MM-DD or an ISO-8601 timestamp
    pub date: String,
    /// Booking details as JSON, e.g. '{"wedding":{"groom_name":"Ali","bride_name":"Sara"}}'
    #[arg(long)]
    pub booking: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cached NAS availability
    Status,
    /// Re-probe NAS availability now
    Refresh,
    /// Probe known paths and diagnose an unreachable NAS
    Detect,
    /// Ask the OS to connect the share
    Mount,
    /// Mount-table inspection and brute-force mounting
    AutoMount,
    /// Create the session folder tree on the active root
    CreateSession(SessionArgs),
    SessionExists(SessionArgs),
    SessionPath(SessionArgs),
    /// Media counts per subfolder
    Stats { path: PathBuf },
    /// Copy or move files between subfolders of a session
    Transfer {
        path: PathBuf,
        from: Subfolder,
        to: Subfolder,
        #[arg(required = true)]
        files: Vec<String>,
        /// Move instead of copy
        #[arg(long = "move")]
        move_files: bool,
    },
    CacheStatus,
    /// Copy one cached session to the NAS
    Sync(SessionArgs),
    /// Copy every cached session to the NAS
    SyncAll,
    /// Auto-mount, then sync the cache whenever the NAS comes back
    Watch,
    #[command(subcommand)]
    Config(ConfigAction),
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    Show,
    /// Replace every setting with defaults
    Reset,
    SetNas {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        share: Option<String>,
        #[arg(long)]
        subfolder: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    SetCache { path: PathBuf },
}
