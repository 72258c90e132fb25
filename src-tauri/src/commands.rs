// IPC commands for the toolbar and history pages.
// Webview-creating commands are async so they never run on the UI thread.

use tauri::{AppHandle, State};

use crate::error::ShellResult;
use crate::modules::theme::ThemePayload;
use crate::shell;
use crate::state::{AppState, Tab, TabsPayload};

#[tauri::command]
pub async fn new_tab(app: AppHandle, url: Option<String>) -> ShellResult<Tab> {
    shell::create_tab(&app, url.as_deref())
}

#[tauri::command]
pub async fn show_history(app: AppHandle) -> ShellResult<Tab> {
    shell::show_history(&app)
}

#[tauri::command]
pub async fn navigate(app: AppHandle, text: String) -> ShellResult<Option<String>> {
    shell::navigate(&app, &text)
}

#[tauri::command]
pub fn close_tab(app: AppHandle, index: usize) -> ShellResult<()> {
    shell::close_tab(&app, index)
}

#[tauri::command]
pub fn switch_tab(app: AppHandle, index: usize) -> ShellResult<()> {
    shell::switch_tab(&app, index)
}

#[tauri::command]
pub fn go_back(app: AppHandle) -> ShellResult<()> {
    shell::go_back(&app)
}

#[tauri::command]
pub fn go_forward(app: AppHandle) -> ShellResult<()> {
    shell::go_forward(&app)
}

#[tauri::command]
pub fn reload(app: AppHandle) -> ShellResult<()> {
    shell::reload(&app)
}

#[tauri::command]
pub async fn go_home(app: AppHandle) -> ShellResult<()> {
    shell::go_home(&app)
}

#[tauri::command]
pub fn copy_link(app: AppHandle) -> ShellResult<String> {
    shell::copy_active_link(&app)
}

#[tauri::command]
pub fn toggle_theme(app: AppHandle) -> ShellResult<ThemePayload> {
    shell::toggle_theme(&app).map(ThemePayload::from)
}

#[tauri::command]
pub fn get_theme(state: State<'_, AppState>) -> ShellResult<ThemePayload> {
    Ok(ThemePayload::from(state.settings.read()?.theme))
}

#[tauri::command]
pub fn get_tabs(state: State<'_, AppState>) -> ShellResult<TabsPayload> {
    Ok(state.tabs.lock()?.snapshot())
}

#[tauri::command]
pub fn get_history(state: State<'_, AppState>) -> ShellResult<Vec<String>> {
    Ok(state.history.entries()?)
}
