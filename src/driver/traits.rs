use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A native dialog (alert/confirm/prompt) observed in the page since the
/// last navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogEvent {
    /// Dialog kind: "alert", "confirm" or "prompt"
    pub kind: String,
    /// Message the page passed to the dialog
    pub message: String,
}

/// Browser automation surface consumed by the scenarios.
///
/// Elements are addressed by DOM id. Implementations own one live browser
/// session shared across scenarios; `close` tears it down.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Engine name for console output (e.g. "firefox")
    fn name(&self) -> &str;

    /// Navigate the shared session to `url`
    async fn navigate(&self, url: &str) -> Result<()>;

    /// URL the session currently shows
    async fn current_url(&self) -> Result<String>;

    /// Title of the current document
    async fn title(&self) -> Result<String>;

    /// Wait until the element with `id` is present, up to `timeout_ms`.
    /// Returns whether it appeared.
    async fn wait_for_element(&self, id: &str, timeout_ms: u64) -> Result<bool>;

    /// Read an attribute of the element with `id`. `None` means the attribute
    /// is absent; a missing element is an error.
    async fn attribute(&self, id: &str, name: &str) -> Result<Option<String>>;

    /// Replace the element's value with `text` (empty string clears)
    async fn fill(&self, id: &str, text: &str) -> Result<()>;

    /// Native click on the element
    async fn click(&self, id: &str) -> Result<()>;

    /// Run a script against the element with `id`. `script` must be a JS
    /// function expression taking the element, e.g. `el => el.blur()`.
    async fn exec_script(&self, id: &str, script: &str) -> Result<()>;

    /// Full markup of the current document
    async fn page_source(&self) -> Result<String>;

    /// Dialogs fired since the last navigation; an empty list means none
    async fn fired_dialogs(&self) -> Result<Vec<DialogEvent>>;

    /// Write a PNG screenshot of the current viewport to `path`
    async fn take_screenshot(&self, path: &Path) -> Result<()>;

    /// Tear the session down
    async fn close(&self) -> Result<()>;

    /// Scroll the element to the viewport center
    async fn scroll_into_view(&self, id: &str) -> Result<()> {
        self.exec_script(id, "el => el.scrollIntoView({block: 'center'})")
            .await
    }

    /// Move focus onto the element
    async fn focus(&self, id: &str) -> Result<()> {
        self.exec_script(id, "el => el.focus()").await
    }

    /// Drop focus from the element, firing its blur listeners
    async fn blur(&self, id: &str) -> Result<()> {
        self.exec_script(id, "el => el.blur()").await
    }

    /// Script-injected click, for controls a native click cannot reach
    async fn click_via_script(&self, id: &str) -> Result<()> {
        self.exec_script(id, "el => el.click()").await
    }
}
