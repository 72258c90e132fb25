// Browser shell operations: the glue between tab bookkeeping and the real
// webviews hosted in the main window.
//
// Invariant: the tab strip lock is never held across a webview call, since
// webview callbacks (page load, download) take it again on the UI thread.

use std::fs;
use std::io;
use std::sync::Mutex;

use serde::Serialize;
use tauri::webview::{DownloadEvent, PageLoadEvent, PageLoadPayload};
use tauri::{
    AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize, Position, Rect, Size, Webview,
    WebviewBuilder, WebviewUrl, Window,
};
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_dialog::DialogExt;
use url::Url;

use crate::error::{ShellError, ShellResult};
use crate::modules::downloads::{move_file, suggested_file_name, DownloadAction};
use crate::modules::navigation::{
    page_load, plan_navigation, start_address, NavigationPlan, NavigationSource, NavigationTarget,
    PageLoad, BLANK_PAGE,
};
use crate::modules::tabs::CloseOutcome;
use crate::modules::theme::{Theme, ThemePayload};
use crate::state::{AppState, Tab, TabKind};

pub const MAIN_WINDOW: &str = "main";
pub const HISTORY_PAGE: &str = "history.html";

pub const EVENT_TABS_CHANGED: &str = "tabs-changed";
pub const EVENT_THEME_CHANGED: &str = "theme-changed";
pub const EVENT_DOWNLOAD_FINISHED: &str = "download-finished";
pub const EVENT_FOCUS_ADDRESS: &str = "focus-url-bar";

/// Tab strip row plus navigation bar, in logical pixels.
const TOOLBAR_HEIGHT_LOGICAL: f64 = 36.0 + 48.0;

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadFinishedPayload {
    url: String,
    path: Option<String>,
    success: bool,
}

pub fn main_window(app: &AppHandle) -> ShellResult<Window> {
    app.get_window(MAIN_WINDOW)
        .ok_or_else(|| ShellError::WindowNotFound(MAIN_WINDOW.to_string()))
}

fn webview(app: &AppHandle, label: &str) -> ShellResult<Webview> {
    app.get_webview(label)
        .ok_or_else(|| ShellError::WebviewNotFound(label.to_string()))
}

fn active_tab(app: &AppHandle) -> ShellResult<Tab> {
    let state = app.state::<AppState>();
    let tabs = state.tabs.lock()?;
    tabs.active().cloned().ok_or(ShellError::NoActiveTab)
}

fn active_webview(app: &AppHandle) -> ShellResult<Webview> {
    let tab = active_tab(app)?;
    webview(app, &tab.webview_label)
}

/// Area below the toolbar, shared by every tab webview.
fn content_bounds(window: &Window) -> ShellResult<Rect> {
    let physical_size = window.inner_size()?;
    let scale_factor = window.scale_factor()?;
    let toolbar_height = (TOOLBAR_HEIGHT_LOGICAL * scale_factor) as u32;
    let content_height = physical_size.height.saturating_sub(toolbar_height).max(100);

    Ok(Rect {
        position: Position::Physical(PhysicalPosition::new(0, toolbar_height as i32)),
        size: Size::Physical(PhysicalSize::new(physical_size.width, content_height)),
    })
}

/// Resizes every tab webview to the current content area.
pub fn relayout(app: &AppHandle) -> ShellResult<()> {
    let window = main_window(app)?;
    let bounds = content_bounds(&window)?;
    let labels = app.state::<AppState>().tabs.lock()?.labels();

    for label in labels {
        if let Some(wv) = app.get_webview(&label) {
            wv.set_bounds(bounds.clone())?;
        }
    }
    Ok(())
}

pub fn emit_tabs(app: &AppHandle) -> ShellResult<()> {
    let snapshot = app.state::<AppState>().tabs.lock()?.snapshot();
    app.emit(EVENT_TABS_CHANGED, snapshot)?;
    Ok(())
}

/// Hides every tab webview except the active one, which is shown and
/// focused. The split is read under the lock and applied after it.
fn sync_visibility(app: &AppHandle) -> ShellResult<()> {
    let (shown, hidden) = app.state::<AppState>().tabs.lock()?.visibility();

    for label in hidden {
        if let Some(wv) = app.get_webview(&label) {
            wv.hide()?;
        }
    }
    if let Some(label) = shown {
        let wv = webview(app, &label)?;
        wv.show()?;
        wv.set_focus()?;
    }
    Ok(())
}

fn homepage(app: &AppHandle) -> ShellResult<String> {
    Ok(app.state::<AppState>().settings.read()?.homepage.clone())
}

/// Opens a tab on the start page, or on `url` when it is given.
/// Not recorded in history.
pub fn create_tab(app: &AppHandle, url: Option<&str>) -> ShellResult<Tab> {
    let homepage = homepage(app)?;
    open_web_tab(app, &start_address(url, &homepage))
}

/// Opens the history pseudo-tab listing every logged address.
pub fn show_history(app: &AppHandle) -> ShellResult<Tab> {
    open_tab(app, TabKind::History, "", WebviewUrl::App(HISTORY_PAGE.into()), None)
}

/// Opens a web tab on `address`. An address the URL parser rejects is still
/// attempted: the tab starts blank and the engine is pointed at it once the
/// blank page is up.
fn open_web_tab(app: &AppHandle, address: &str) -> ShellResult<Tab> {
    let (initial, deferred) = match page_load(address) {
        PageLoad::Direct(url) => (url, None),
        PageLoad::Script(address) => (Url::parse(BLANK_PAGE)?, Some(address)),
    };
    open_tab(app, TabKind::Web, address, WebviewUrl::External(initial), deferred)
}

fn open_tab(
    app: &AppHandle,
    kind: TabKind,
    address: &str,
    url: WebviewUrl,
    deferred: Option<String>,
) -> ShellResult<Tab> {
    let state = app.state::<AppState>();
    let window = main_window(app)?;
    let bounds = content_bounds(&window)?;

    let (tab, switch) = state.tabs.lock()?.open(kind, address);
    let builder = tab_webview_builder(app, &tab.webview_label, kind, url, deferred);

    if let Err(e) = window.add_child(builder, bounds.position, bounds.size) {
        log::error!("[Tabs] Failed to create webview {}: {}", tab.webview_label, e);
        state.tabs.lock()?.rollback_open(&switch);
        return Err(e.into());
    }

    sync_visibility(app)?;
    log::info!("[Tabs] Opened {} ({:?}) at '{}'", tab.webview_label, kind, address);
    emit_tabs(app)?;
    Ok(tab)
}

fn tab_webview_builder(
    app: &AppHandle,
    label: &str,
    kind: TabKind,
    url: WebviewUrl,
    deferred: Option<String>,
) -> WebviewBuilder<tauri::Wry> {
    let page_app = app.clone();
    let deferred = Mutex::new(deferred);
    let builder = WebviewBuilder::new(label, url).on_page_load(move |webview, payload| {
        if matches!(payload.event(), PageLoadEvent::Finished) {
            let address = deferred.lock().ok().and_then(|mut pending| pending.take());
            if let Some(address) = address {
                if let Err(e) = assign_location(&webview, &address) {
                    log::warn!("[Navigate] {} could not load '{}': {}", webview.label(), address, e);
                }
            }
        }
        handle_page_load(&page_app, &webview, &payload)
    });

    match kind {
        TabKind::Web => {
            let download_app = app.clone();
            builder.on_download(move |webview, event| handle_download(&download_app, &webview, event))
        }
        TabKind::History => builder,
    }
}

/// Keeps the stored tab address in step with what the engine reports.
fn handle_page_load(app: &AppHandle, webview: &Webview, payload: &PageLoadPayload<'_>) {
    if let PageLoadEvent::Finished = payload.event() {
        log::debug!("[Tabs] {} finished loading {}", webview.label(), payload.url());
    }

    let changed = match app.state::<AppState>().tabs.lock() {
        Ok(mut tabs) => tabs.record_url(webview.label(), payload.url().as_str()),
        Err(e) => {
            log::error!("[Tabs] {}", ShellError::from(e));
            return;
        }
    };

    if changed {
        if let Err(e) = emit_tabs(app) {
            log::warn!("[Tabs] Failed to publish address change: {}", e);
        }
    }
}

/// Loads `address` in a tab's webview. Parseable addresses of any scheme go
/// through the webview's own navigation; anything else is assigned to
/// `location.href` so the engine shows its own error page.
fn load_address(app: &AppHandle, label: &str, address: &str) -> ShellResult<()> {
    let wv = webview(app, label)?;
    match page_load(address) {
        PageLoad::Direct(url) => wv.navigate(url)?,
        PageLoad::Script(address) => assign_location(&wv, &address)?,
    }
    Ok(())
}

fn assign_location(webview: &Webview, address: &str) -> ShellResult<()> {
    let js_script = format!("window.location.href = {}", serde_json::to_string(address)?);
    webview.eval(&js_script)?;
    Ok(())
}

/// Carries out a navigation plan against the current tabs.
fn execute_plan(app: &AppHandle, plan: &NavigationPlan, active: Option<&Tab>) -> ShellResult<()> {
    match (plan.target, active) {
        (NavigationTarget::ActiveTab, Some(tab)) => {
            load_address(app, &tab.webview_label, &plan.address)?;
            log::info!("[Navigate] {} -> {}", tab.webview_label, plan.address);
        }
        _ => {
            let tab = open_web_tab(app, &plan.address)?;
            log::info!("[Navigate] new {} -> {}", tab.webview_label, plan.address);
        }
    }

    if plan.record {
        let state = app.state::<AppState>();
        if let Err(e) = state.history.append(&plan.address) {
            log::warn!(
                "[History] Failed to append to {}: {}",
                state.history.path().display(),
                e
            );
        }
    }
    Ok(())
}

/// Loads address-bar text in the active tab and records it in history.
/// A page-less active tab gets a new web tab instead.
///
/// Returns the loaded address, or `None` when the text was blank.
pub fn navigate(app: &AppHandle, text: &str) -> ShellResult<Option<String>> {
    let homepage = homepage(app)?;
    let active = active_tab(app).ok();
    let kind = active.as_ref().map(|t| t.kind);

    let Some(plan) = plan_navigation(NavigationSource::Typed, Some(text), kind, &homepage) else {
        return Ok(None);
    };
    execute_plan(app, &plan, active.as_ref())?;
    Ok(Some(plan.address))
}

pub fn go_back(app: &AppHandle) -> ShellResult<()> {
    active_webview(app)?.eval("window.history.back()")?;
    Ok(())
}

pub fn go_forward(app: &AppHandle) -> ShellResult<()> {
    active_webview(app)?.eval("window.history.forward()")?;
    Ok(())
}

pub fn reload(app: &AppHandle) -> ShellResult<()> {
    active_webview(app)?.eval("window.location.reload()")?;
    Ok(())
}

/// Loads the start page in the active tab. Not recorded in history.
pub fn go_home(app: &AppHandle) -> ShellResult<()> {
    let homepage = homepage(app)?;
    let active = active_tab(app).ok();
    let kind = active.as_ref().map(|t| t.kind);

    match plan_navigation(NavigationSource::Home, None, kind, &homepage) {
        Some(plan) => execute_plan(app, &plan, active.as_ref()),
        None => Ok(()),
    }
}

/// Copies the active webview's current address to the clipboard.
pub fn copy_active_link(app: &AppHandle) -> ShellResult<String> {
    let url = active_webview(app)?.url()?.to_string();
    app.clipboard()
        .write_text(url.clone())
        .map_err(|e| ShellError::Clipboard(e.to_string()))?;
    log::debug!("[Clipboard] Copied {}", url);
    Ok(url)
}

pub fn switch_tab(app: &AppHandle, index: usize) -> ShellResult<()> {
    let switch = app.state::<AppState>().tabs.lock()?.activate(index)?;
    if let Some(switch) = switch {
        sync_visibility(app)?;
        log::debug!("[Tabs] Switched to {}", switch.show);
        emit_tabs(app)?;
    }
    Ok(())
}

/// Closes the tab at `index`; closing the last tab closes the window.
pub fn close_tab(app: &AppHandle, index: usize) -> ShellResult<()> {
    let outcome = app.state::<AppState>().tabs.lock()?.close(index)?;

    match outcome {
        CloseOutcome::CloseWindow => {
            log::info!("[Tabs] Last tab closed, closing window");
            main_window(app)?.close()?;
        }
        CloseOutcome::Closed { removed, activated } => {
            if let Some(wv) = app.get_webview(&removed.webview_label) {
                wv.close()?;
            }
            if let Some(label) = activated {
                log::debug!("[Tabs] {} takes over from closed tab", label);
            }
            sync_visibility(app)?;
            log::info!("[Tabs] Closed {} at '{}'", removed.webview_label, removed.url);
            emit_tabs(app)?;
        }
    }
    Ok(())
}

pub fn close_active_tab(app: &AppHandle) -> ShellResult<()> {
    let index = app
        .state::<AppState>()
        .tabs
        .lock()?
        .active_index()
        .ok_or(ShellError::NoActiveTab)?;
    close_tab(app, index)
}

/// Flips the theme, persists it and re-applies the window style.
pub fn toggle_theme(app: &AppHandle) -> ShellResult<Theme> {
    let state = app.state::<AppState>();
    let settings = {
        let mut settings = state.settings.write()?;
        settings.theme = settings.theme.toggled();
        settings.clone()
    };

    if let Err(e) = settings.save_to(&state.settings_path) {
        log::warn!("[Settings] Failed to save theme: {}", e);
    }

    apply_theme(app, settings.theme)?;
    Ok(settings.theme)
}

/// Applies `theme` to the native window and every page drawing shell chrome.
pub fn apply_theme(app: &AppHandle, theme: Theme) -> ShellResult<()> {
    let native = match theme {
        Theme::Light => tauri::Theme::Light,
        Theme::Dark => tauri::Theme::Dark,
    };
    if let Err(e) = main_window(app)?.set_theme(Some(native)) {
        log::warn!("[Theme] Native window theme not applied: {}", e);
    }

    app.emit(EVENT_THEME_CHANGED, ThemePayload::from(theme))?;
    log::info!("[Theme] Applied {:?}", theme);
    Ok(())
}

pub fn focus_address_bar(app: &AppHandle) -> ShellResult<()> {
    main_window(app)?.set_focus()?;
    webview(app, MAIN_WINDOW)?.set_focus()?;
    app.emit(EVENT_FOCUS_ADDRESS, ())?;
    Ok(())
}

/// Download hook for web tabs. Returns whether the engine may proceed.
///
/// Every request is accepted into a staging file while the save dialog is
/// open; it is only refused when it cannot be staged.
fn handle_download(app: &AppHandle, webview: &Webview, event: DownloadEvent<'_>) -> bool {
    let state = app.state::<AppState>();
    match event {
        DownloadEvent::Requested { url, destination } => {
            let staged = fs::create_dir_all(state.downloads.staging_dir())
                .map_err(ShellError::from)
                .and_then(|_| state.downloads.begin(webview.label(), &url));

            match staged {
                Ok((id, staging)) => {
                    log::info!("[Download] Requested {}, staging at {}", url, staging.display());
                    *destination = staging;
                    prompt_save_path(app, id, &url);
                    true
                }
                Err(e) => {
                    log::error!("[Download] Refused {}: {}", url, e);
                    false
                }
            }
        }
        DownloadEvent::Finished { url, path, success } => {
            if success {
                log::info!("[Download] Transfer finished {}", url);
            } else {
                log::warn!("[Download] Transfer failed {}", url);
            }
            match state.downloads.finish(webview.label(), &url, path.as_deref(), success) {
                Ok(action) => settle_download(app, action),
                Err(e) => log::error!("[Download] {}", e),
            }
            true
        }
        _ => true,
    }
}

/// Asks for a destination. A cancelled dialog rejects the download: the
/// staged data is discarded.
fn prompt_save_path(app: &AppHandle, id: u64, url: &Url) {
    let app_handle = app.clone();
    let url = url.clone();

    app.dialog()
        .file()
        .set_title("Save File")
        .set_file_name(suggested_file_name(&url))
        .save_file(move |choice| {
            let destination = match choice.map(|c| c.into_path()) {
                Some(Ok(path)) => Some(path),
                Some(Err(e)) => {
                    log::warn!("[Download] Unusable save path for {}: {}", url, e);
                    None
                }
                None => {
                    log::info!("[Download] Save dialog cancelled for {}", url);
                    None
                }
            };

            match app_handle.state::<AppState>().downloads.choose(id, destination) {
                Ok(action) => settle_download(&app_handle, action),
                Err(e) => log::error!("[Download] {}", e),
            }
        });
}

fn settle_download(app: &AppHandle, action: DownloadAction) {
    let payload = match action {
        DownloadAction::Wait => return,
        DownloadAction::Move { url, from, to } => match move_file(&from, &to) {
            Ok(()) => {
                log::info!("[Download] Saved {} to {}", url, to.display());
                DownloadFinishedPayload {
                    url,
                    path: Some(to.display().to_string()),
                    success: true,
                }
            }
            Err(e) => {
                log::error!(
                    "[Download] Could not move {} to {}: {}",
                    from.display(),
                    to.display(),
                    e
                );
                DownloadFinishedPayload { url, path: None, success: false }
            }
        },
        DownloadAction::Discard { url, staging, failed } => {
            if let Err(e) = fs::remove_file(&staging) {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("[Download] Could not remove {}: {}", staging.display(), e);
                }
            }
            if !failed {
                log::info!("[Download] Rejected {}", url);
                return;
            }
            DownloadFinishedPayload { url, path: None, success: false }
        }
    };

    if let Err(e) = app.emit(EVENT_DOWNLOAD_FINISHED, payload) {
        log::warn!("[Download] Failed to publish result: {}", e);
    }
}
