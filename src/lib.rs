#[cfg(feature = "desktop")]
mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging on stderr. `RUST_LOG` overrides
/// `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;
    use tauri::Manager;
    use tokio::sync::Mutex;

    use crate::core::state::{default_data_dir, AppState, API_BASE_ENV};

    init_tracing("info,rtm_addon_manager_lib=debug");
    tracing::info!("RTM Addon Manager starting...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let runtime_base = std::env::var(API_BASE_ENV).ok();
            let state = AppState::new(default_data_dir(), runtime_base)?;
            app.manage(Arc::new(Mutex::new(state)));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::fetch_train_list,
            commands::search_trains,
            commands::select_train,
            commands::set_panel_open,
            commands::get_selected_detail,
            commands::choose_version,
            commands::request_download,
            commands::set_terms_agreed,
            commands::confirm_terms,
            commands::dismiss_terms,
            commands::report_image_error,
            commands::get_settings,
            commands::update_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
