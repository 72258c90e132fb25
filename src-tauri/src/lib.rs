// Tabbed Shell Library Entry Point
// This file exposes all modules so they can be imported by main.rs
// and tested independently.

use tauri::Manager;

pub mod error;
pub mod history;
pub mod settings;
pub mod state;

// Pure logic modules (no Tauri window handles)
pub mod modules;

// Tauri glue
pub mod commands;
pub mod menu;
pub mod shell;

use settings::Settings;
use state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let log_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_log::Builder::default().level(log_level).build())
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let handle = app.handle().clone();

            // --- Shared state ---
            let data_dir = handle.path().app_data_dir()?;
            let settings_path = Settings::get_path(&handle)?;
            let settings = Settings::load_from(&settings_path);
            let theme = settings.theme;
            log::info!("[Settings] Loaded from {}", settings_path.display());
            app.manage(AppState::new(settings, settings_path, data_dir));

            // --- Native menu ---
            app.set_menu(menu::build(&handle)?)?;
            app.on_menu_event(|app_handle, event| {
                menu::handle_event(app_handle, event.id().0.as_str());
            });

            // --- First tab and window style ---
            shell::create_tab(&handle, None)?;
            shell::apply_theme(&handle, theme)?;

            // Handle window resizing
            let main_window = shell::main_window(&handle)?;
            let resize_handle = handle.clone();
            main_window.on_window_event(move |event| {
                if let tauri::WindowEvent::Resized(_) = event {
                    if let Err(e) = shell::relayout(&resize_handle) {
                        log::warn!("[Layout] Failed to resize tabs: {}", e);
                    }
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::new_tab,
            commands::show_history,
            commands::navigate,
            commands::close_tab,
            commands::switch_tab,
            commands::go_back,
            commands::go_forward,
            commands::reload,
            commands::go_home,
            commands::copy_link,
            commands::toggle_theme,
            commands::get_theme,
            commands::get_tabs,
            commands::get_history
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
