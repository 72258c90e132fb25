// Tab bookkeeping - pure logic, no webview handles.
// The shell applies the returned show/hide/close decisions to real webviews.

use crate::error::{ShellError, ShellResult};
use crate::modules::navigation::tab_title;
use crate::state::{Tab, TabKind, TabsPayload};

/// Which webview to hide and which to show after the active tab changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub hide: Option<String>,
    pub show: String,
}

#[derive(Debug, PartialEq)]
pub enum CloseOutcome {
    /// The tab was the last one; the window must close instead.
    CloseWindow,
    /// The tab was removed. `activated` names the webview to show when the
    /// removed tab was the active one.
    Closed {
        removed: Tab,
        activated: Option<String>,
    },
}

/// Ordered tabs plus the active index.
///
/// Invariant: `active` is `Some` and in bounds whenever `tabs` is non-empty.
#[derive(Debug, Default)]
pub struct TabStrip {
    tabs: Vec<Tab>,
    active: Option<usize>,
    next_id: u64,
}

impl TabStrip {
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn labels(&self) -> Vec<String> {
        self.tabs.iter().map(|t| t.webview_label.clone()).collect()
    }

    /// Appends a tab and makes it active.
    pub fn open(&mut self, kind: TabKind, url: &str) -> (Tab, Switch) {
        self.next_id += 1;
        let title = match kind {
            TabKind::Web => tab_title(url),
            TabKind::History => "History".to_string(),
        };
        let tab = Tab {
            id: self.next_id,
            webview_label: format!("tab-{}", self.next_id),
            kind,
            title,
            url: url.to_string(),
        };

        let hide = self.active().map(|t| t.webview_label.clone());
        self.tabs.push(tab.clone());
        self.active = Some(self.tabs.len() - 1);

        let show = tab.webview_label.clone();
        (tab, Switch { hide, show })
    }

    /// Undoes an `open` whose webview could not be created: drops the new
    /// tab and reactivates the one it replaced.
    pub fn rollback_open(&mut self, switch: &Switch) {
        self.tabs.retain(|t| t.webview_label != switch.show);
        let previous = switch
            .hide
            .as_ref()
            .and_then(|label| self.tabs.iter().position(|t| &t.webview_label == label));
        self.active = match previous {
            Some(i) => Some(i),
            None if self.tabs.is_empty() => None,
            None => Some(self.tabs.len() - 1),
        };
    }

    /// Makes the tab at `index` active. Returns `None` when it already is.
    pub fn activate(&mut self, index: usize) -> ShellResult<Option<Switch>> {
        let target = self.tabs.get(index).ok_or(ShellError::NoSuchTab(index))?;
        if self.active == Some(index) {
            return Ok(None);
        }
        let switch = Switch {
            hide: self.active().map(|t| t.webview_label.clone()),
            show: target.webview_label.clone(),
        };
        self.active = Some(index);
        Ok(Some(switch))
    }

    /// Removes the tab at `index`, unless it is the only one.
    ///
    /// When the active tab goes away the tab sliding into its slot becomes
    /// active, or the new last tab when the removed one was rightmost.
    pub fn close(&mut self, index: usize) -> ShellResult<CloseOutcome> {
        if index >= self.tabs.len() {
            return Err(ShellError::NoSuchTab(index));
        }
        if self.tabs.len() == 1 {
            return Ok(CloseOutcome::CloseWindow);
        }

        let removed = self.tabs.remove(index);
        let mut activated = None;

        match self.active {
            Some(active) if active == index => {
                let next = index.min(self.tabs.len() - 1);
                self.active = Some(next);
                activated = Some(self.tabs[next].webview_label.clone());
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }

        Ok(CloseOutcome::Closed { removed, activated })
    }

    /// Records the address a web tab's webview reports. Returns true when
    /// the stored address changed. History tabs keep their empty address.
    pub fn record_url(&mut self, label: &str, url: &str) -> bool {
        match self.tabs.iter_mut().find(|t| t.webview_label == label) {
            Some(tab) if tab.kind == TabKind::Web && tab.url != url => {
                tab.url = url.to_string();
                tab.title = tab_title(url);
                true
            }
            _ => false,
        }
    }

    /// The webview that should be visible and every other tab webview.
    /// Applying the whole split, rather than a single switch, leaves exactly
    /// one tab showing even when switches race each other.
    pub fn visibility(&self) -> (Option<String>, Vec<String>) {
        let shown = self.active().map(|t| t.webview_label.clone());
        let hidden = self
            .tabs
            .iter()
            .filter(|t| Some(&t.webview_label) != shown.as_ref())
            .map(|t| t.webview_label.clone())
            .collect();
        (shown, hidden)
    }

    pub fn snapshot(&self) -> TabsPayload {
        TabsPayload {
            tabs: self.tabs.clone(),
            active_index: self.active,
        }
    }
}
