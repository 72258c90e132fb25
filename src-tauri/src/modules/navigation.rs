// Pure navigation logic - no Tauri imports allowed.
// This module contains address-bar handling that can be unit tested.

use url::Url;

use crate::state::TabKind;

/// Scheme prepended to addresses typed without one.
pub const DEFAULT_SCHEME: &str = "https://";

/// Page a tab starts on when its address cannot be handed over as a URL.
pub const BLANK_PAGE: &str = "about:blank";

/// Schemes without an authority (`scheme:` not followed by `//`) that are
/// still passed through untouched.
const OPAQUE_SCHEMES: [&str; 6] = ["about", "data", "mailto", "view-source", "blob", "javascript"];

/// Turns address-bar text into the address handed to the webview.
///
/// The text is only trimmed and, when it does not start with a scheme,
/// prefixed with `https://`. No other validation or normalization happens:
/// the returned string is exactly what gets loaded and written to history,
/// and malformed addresses are left for the engine's own error page.
///
/// Returns `None` for blank input.
pub fn resolve_address(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if has_scheme(trimmed) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}{}", DEFAULT_SCHEME, trimmed))
    }
}

/// True when `input` begins with an RFC 3986 scheme followed by `//`, or with
/// one of the opaque schemes. `localhost:3000` and `httpbin.org` do not
/// qualify.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !well_formed {
        return false;
    }

    rest.starts_with("//")
        || OPAQUE_SCHEMES
            .iter()
            .any(|opaque| opaque.eq_ignore_ascii_case(scheme))
}

/// Address for a new tab: the given text when it is not blank, otherwise the
/// start page.
pub fn start_address(url: Option<&str>, homepage: &str) -> String {
    url.and_then(resolve_address)
        .unwrap_or_else(|| homepage.to_string())
}

/// How an address reaches the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PageLoad {
    /// Parses as a URL; handed to the webview's own navigation.
    Direct(Url),
    /// Does not parse; assigned to `location.href` so the engine's error
    /// handling decides what happens.
    Script(String),
}

pub fn page_load(address: &str) -> PageLoad {
    match Url::parse(address) {
        Ok(url) => PageLoad::Direct(url),
        Err(_) => PageLoad::Script(address.to_string()),
    }
}

/// Why a navigation happens. Only typed addresses count as explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSource {
    /// Submitted from the address field.
    Typed,
    /// The home control.
    Home,
    /// New tab, open-in-new-tab, or a history entry click.
    NewTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    ActiveTab,
    NewTab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPlan {
    pub address: String,
    pub target: NavigationTarget,
    /// Whether the address is appended to the history log.
    pub record: bool,
}

/// Decides what to load, where, and whether it is logged.
///
/// A page-less active tab (history listing, or none at all) never receives
/// a load; the address opens in a new tab instead. Returns `None` for a
/// typed blank input.
pub fn plan_navigation(
    source: NavigationSource,
    text: Option<&str>,
    active: Option<TabKind>,
    homepage: &str,
) -> Option<NavigationPlan> {
    let in_place = match active {
        Some(TabKind::Web) => NavigationTarget::ActiveTab,
        Some(TabKind::History) | None => NavigationTarget::NewTab,
    };

    let plan = match source {
        NavigationSource::Typed => NavigationPlan {
            address: resolve_address(text?)?,
            target: in_place,
            record: true,
        },
        NavigationSource::Home => NavigationPlan {
            address: homepage.to_string(),
            target: in_place,
            record: false,
        },
        NavigationSource::NewTab => NavigationPlan {
            address: start_address(text, homepage),
            target: NavigationTarget::NewTab,
            record: false,
        },
    };
    Some(plan)
}

/// Label shown on a tab button for a page address.
pub fn tab_title(address: &str) -> String {
    match Url::parse(address) {
        Ok(u) => match u.host_str() {
            Some(host) => host.trim_start_matches("www.").to_string(),
            None => u.scheme().to_string(),
        },
        Err(_) => "New Tab".to_string(),
    }
}
