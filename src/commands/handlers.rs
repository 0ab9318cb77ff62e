//! Command handlers
//!
//! Runs a parsed command against the storage service and renders the JSON response.

use log::info;
use std::sync::Arc;

use crate::commands::parser::{Command, ConfigAction, SessionArgs};
use crate::config::StoreConfig;
use crate::error::{StorageError, StudioError};
use crate::service::{Response, StudioStorage, SyncWatcher};
use crate::session::BookingDetails;

/// Output printed for the command and whether it succeeded
pub struct CommandOutcome {
    pub output: String,
    pub success: bool,
}

impl<T: serde::Serialize> From<Response<T>> for CommandOutcome {
    fn from(response: Response<T>) -> Self {
        Self {
            output: response.to_json(),
            success: response.success,
        }
    }
}

fn parse_booking(args: &SessionArgs) -> Result<Option<BookingDetails>, StudioError> {
    match &args.booking {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw).map(Some).map_err(|e| {
            StorageError::InvalidInput(format!("booking details: {}", e)).into()
        }),
    }
}

/// Passwords never leave the process
fn redacted(mut cfg: StoreConfig) -> StoreConfig {
    if cfg.nas.password.is_some() {
        cfg.nas.password = Some("********".to_string());
    }
    cfg
}

pub async fn execute(command: Command, storage: Arc<StudioStorage>) -> CommandOutcome {
    match command {
        Command::Status => Response::ok(storage.network_status().await).into(),
        Command::Refresh => Response::ok(storage.check_network_availability().await).into(),
        Command::Detect => {
            let result = storage.detect_nas().await;
            if result.path.is_some() {
                Response::ok(result).into()
            } else {
                Response::failed(result, "NAS not found").into()
            }
        }
        Command::Mount => mount_response(storage.mount_nas().await),
        Command::AutoMount => mount_response(storage.auto_mount_on_startup().await),
        Command::CreateSession(args) => {
            let result = match parse_booking(&args) {
                Ok(booking) => {
                    storage
                        .create_session_directory(&args.client, &args.session_id, &args.date, booking)
                        .await
                }
                Err(e) => Err(e),
            };
            Response::from(result).into()
        }
        Command::SessionExists(args) => {
            let result = match parse_booking(&args) {
                Ok(booking) => {
                    storage
                        .check_session_exists(&args.client, &args.session_id, &args.date, booking)
                        .await
                }
                Err(e) => Err(e),
            };
            Response::from(result).into()
        }
        Command::SessionPath(args) => {
            let result = match parse_booking(&args) {
                Ok(booking) => {
                    storage
                        .get_session_path(&args.client, &args.session_id, &args.date, booking)
                        .await
                }
                Err(e) => Err(e),
            };
            Response::from(result).into()
        }
        Command::Stats { path } => Response::from(storage.get_folder_stats(&path).await).into(),
        Command::Transfer {
            path,
            from,
            to,
            files,
            move_files,
        } => {
            let result = if move_files {
                storage.move_files(&path, from, to, &files).await
            } else {
                storage.copy_files(&path, from, to, &files).await
            };
            Response::from(result).into()
        }
        Command::CacheStatus => Response::from(storage.get_cache_status().await).into(),
        Command::Sync(args) => {
            let result = match parse_booking(&args) {
                Ok(booking) => {
                    storage
                        .sync_cache_to_nas(&args.client, &args.session_id, &args.date, booking)
                        .await
                }
                Err(e) => Err(e),
            };
            Response::from(result).into()
        }
        Command::SyncAll => Response::from(storage.sync_all_cached_sessions().await).into(),
        Command::Watch => {
            if let Some(report) = storage.startup().await {
                info!("Startup auto-mount: {}", report.message);
            }
            SyncWatcher::new(Arc::clone(&storage))
                .run_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            Response::ok("stopped").into()
        }
        Command::Config(action) => config_command(action, &storage).await,
    }
}

fn mount_response(report: crate::mount::MountReport) -> CommandOutcome {
    if report.success {
        Response::ok(report).into()
    } else {
        let message = report.message.clone();
        Response::failed(report, message).into()
    }
}

async fn config_command(action: ConfigAction, storage: &StudioStorage) -> CommandOutcome {
    let store = storage.config();
    let result = match action {
        ConfigAction::Show => Ok(store.snapshot().await),
        ConfigAction::Reset => store.reset().await,
        ConfigAction::SetNas {
            host,
            share,
            subfolder,
            username,
            password,
        } => {
            store
                .update(|cfg| {
                    if let Some(host) = host {
                        cfg.nas.host = host;
                    }
                    if let Some(share) = share {
                        cfg.nas.share = share;
                    }
                    if let Some(sub) = subfolder {
                        cfg.nas.subfolder = Some(sub).filter(|s| !s.is_empty());
                    }
                    if let Some(user) = username {
                        cfg.nas.username = Some(user).filter(|u| !u.is_empty());
                    }
                    if let Some(pw) = password {
                        cfg.nas.password = Some(pw).filter(|p| !p.is_empty());
                    }
                    cfg.nas.discovered_path = None;
                })
                .await
        }
        ConfigAction::SetCache { path } => store.update(|cfg| cfg.cache.path = path).await,
    };
    Response::from(result.map(redacted)).into()
}
