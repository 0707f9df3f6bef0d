//! App Store - Entry Point
//!
//! Loads configuration, opens the app store and serves the operator console
//! on stdin/stdout.

use std::process::ExitCode;
use std::sync::Arc;

use log::info;
use tokio::io::{BufReader, stdin, stdout};

use app_store::console::run_session;
use app_store::error::handlers::handle_error;
use app_store::utils::logging::setup_logging;
use app_store::{AppStore, ServiceConfig, ServiceError};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServiceError> {
    let config = ServiceConfig::load()?;
    info!("Save directory: {}", config.save_dir_path().display());

    // Fails fast if the storage root cannot be created.
    let store = AppStore::open(config.apps_root())?.with_cleanup(config.cleanup_failed_creates);

    run_session(Arc::new(store), BufReader::new(stdin()), stdout()).await?;
    Ok(())
}
