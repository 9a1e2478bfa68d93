//! FileDesk - document dashboard for a JSON files backend
//!
//! Main entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use anyhow::Result;
use app_api::FilesApi;
use app_core::{AppConfig, AppError, AppState};
use app_db::PreferenceStore;
use std::sync::Arc;

fn main() -> Result<()> {
    // Logging and the panic hook come first; the guard flushes the log file on exit
    let _log_guard = app_log::init()?;

    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("FileDesk starting...");

    // Write the defaults once so there is a file to edit
    if !AppConfig::config_path().exists() {
        if let Err(e) = AppConfig::default().save() {
            tracing::warn!("Failed to write default configuration: {}", e);
        }
    }
    let config = AppConfig::load();

    let prefs = match app_db::init() {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!("Failed to open preferences: {}. Running without persistence.", e);
            PreferenceStore::in_memory()
        }
    };

    let api = FilesApi::new(&config.api.base_url, config.api.timeout())
        .map_err(|e| AppError::Config(format!("api.base_url: {}", e)))?;
    tracing::info!(base_url = %api.base_url(), "Files backend configured");

    let state = Arc::new(AppState::new(config, prefs, Arc::new(api)));

    app::run(state)
}
