//! Studio Storage - Entry Point
//!
//! Command line front end for the NAS / local cache storage core.

use clap::Parser;
use log::{error, info};
use std::sync::Arc;

use studio_storage::commands::{Cli, execute};
use studio_storage::config::ConfigStore;
use studio_storage::service::StudioStorage;
use studio_storage::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    setup_logging();
    let cli = Cli::parse();

    let store = match cli.config.clone() {
        Some(path) => ConfigStore::load(path),
        None => ConfigStore::load_default(),
    };
    let store = match store {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Cannot load configuration: {}", e);
            std::process::exit(2);
        }
    };
    info!("Using config {}", store.path().display());

    let storage = Arc::new(StudioStorage::new(store).await);
    let outcome = execute(cli.command, storage).await;

    println!("{}", outcome.output);
    if !outcome.success {
        std::process::exit(1);
    }
}
