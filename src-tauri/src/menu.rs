use tauri::menu::{Menu, MenuBuilder, MenuItemBuilder, PredefinedMenuItem, SubmenuBuilder};
use tauri::{AppHandle, Wry};

use crate::shell;

pub fn build(app: &AppHandle) -> tauri::Result<Menu<Wry>> {
    let file_menu = SubmenuBuilder::new(app, "File")
        .item(&MenuItemBuilder::with_id("new_tab", "New Tab").accelerator("CmdOrCtrl+T").build(app)?)
        .item(&MenuItemBuilder::with_id("history", "History").accelerator("CmdOrCtrl+Y").build(app)?)
        .item(&MenuItemBuilder::with_id("close_tab", "Close Tab").accelerator("CmdOrCtrl+W").build(app)?)
        .separator()
        .item(&PredefinedMenuItem::quit(app, Some("Quit"))?)
        .build()?;

    let edit_menu = SubmenuBuilder::new(app, "Edit")
        .item(&PredefinedMenuItem::undo(app, Some("Undo"))?)
        .item(&PredefinedMenuItem::redo(app, Some("Redo"))?)
        .separator()
        .item(&PredefinedMenuItem::cut(app, Some("Cut"))?)
        .item(&PredefinedMenuItem::copy(app, Some("Copy"))?)
        .item(&PredefinedMenuItem::paste(app, Some("Paste"))?)
        .item(&PredefinedMenuItem::select_all(app, Some("Select All"))?)
        .build()?;

    let view_menu = SubmenuBuilder::new(app, "View")
        .item(&MenuItemBuilder::with_id("focus_location", "Open Location").accelerator("CmdOrCtrl+L").build(app)?)
        .item(&MenuItemBuilder::with_id("reload", "Reload Page").accelerator("CmdOrCtrl+R").build(app)?)
        .item(&MenuItemBuilder::with_id("copy_link", "Copy Link").accelerator("CmdOrCtrl+Shift+C").build(app)?)
        .separator()
        .item(&MenuItemBuilder::with_id("toggle_theme", "Toggle Dark Mode").accelerator("CmdOrCtrl+Shift+D").build(app)?)
        .build()?;

    let navigate_menu = SubmenuBuilder::new(app, "Navigate")
        .item(&MenuItemBuilder::with_id("go_back", "Back").accelerator("CmdOrCtrl+[").build(app)?)
        .item(&MenuItemBuilder::with_id("go_forward", "Forward").accelerator("CmdOrCtrl+]").build(app)?)
        .item(&MenuItemBuilder::with_id("go_home", "Home").build(app)?)
        .build()?;

    MenuBuilder::new(app)
        .items(&[&file_menu, &edit_menu, &view_menu, &navigate_menu])
        .build()
}

/// Dispatches a native menu click. Errors are logged; menu callbacks have
/// nowhere to return them.
pub fn handle_event(app: &AppHandle, id: &str) {
    let result = match id {
        "new_tab" => shell::create_tab(app, None).map(|_| ()),
        "history" => shell::show_history(app).map(|_| ()),
        "close_tab" => shell::close_active_tab(app),
        "focus_location" => shell::focus_address_bar(app),
        "reload" => shell::reload(app),
        "copy_link" => shell::copy_active_link(app).map(|_| ()),
        "toggle_theme" => shell::toggle_theme(app).map(|_| ()),
        "go_back" => shell::go_back(app),
        "go_forward" => shell::go_forward(app),
        "go_home" => shell::go_home(app),
        _ => Ok(()),
    };

    if let Err(e) = result {
        log::warn!("[Menu] '{}' failed: {}", id, e);
    }
}
