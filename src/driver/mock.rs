//! In-memory driver used by scenario and runner tests
//!
//! Simulates just enough page behavior to exercise every assertion path:
//! a set of present elements restored on navigation, per-field values, an
//! optional client-side required-validation that accepts or blocks submits,
//! and scripted reflection/dialog signals for the injection probe.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::driver::traits::{BrowserDriver, DialogEvent};

#[derive(Default)]
struct MockState {
    present: HashSet<String>,
    values: HashMap<String, String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    scripts: Vec<(String, String)>,
    screenshots: Vec<PathBuf>,
    dialogs: Vec<DialogEvent>,
    submitted_values: Vec<HashMap<String, String>>,
    closed: bool,
}

pub struct MockDriver {
    state: Mutex<MockState>,
    /// Elements present after every navigation
    page_ids: Vec<String>,
    /// Static attributes per (element id, attribute name)
    attributes: HashMap<(String, String), String>,
    /// Ids the simulated client-side validation requires to be non-empty
    validated_ids: Option<HashSet<String>>,
    submit_id: String,
    title: String,
    url: Option<String>,
    /// Post-submit markup echoes submitted values verbatim
    reflect_submissions: bool,
    /// Submitting fires a native alert
    dialog_on_submit: Option<DialogEvent>,
    fail_screenshots: bool,
    fail_dialog_probe: bool,
}

impl MockDriver {
    /// A static page: every id in `page_ids` is present after navigation and
    /// submits change nothing.
    pub fn new(page_ids: &[&str], submit_id: &str) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            page_ids: page_ids.iter().map(|s| s.to_string()).collect(),
            attributes: HashMap::new(),
            validated_ids: None,
            submit_id: submit_id.to_string(),
            title: "Contact - Cyberhot Security".to_string(),
            url: None,
            reflect_submissions: false,
            dialog_on_submit: None,
            fail_screenshots: false,
            fail_dialog_probe: false,
        }
    }

    /// Like `new`, but a submit is accepted (the form page goes away) iff
    /// every id in `validated` holds a non-empty value.
    pub fn with_validation(page_ids: &[&str], submit_id: &str, validated: &[&str]) -> Self {
        let mut mock = Self::new(page_ids, submit_id);
        mock.validated_ids = Some(validated.iter().map(|s| s.to_string()).collect());
        mock
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
    }

    pub fn set_attribute(&mut self, id: &str, name: &str, value: &str) {
        self.attributes
            .insert((id.to_string(), name.to_string()), value.to_string());
    }

    pub fn set_reflect_submissions(&mut self, reflect: bool) {
        self.reflect_submissions = reflect;
    }

    pub fn set_dialog_on_submit(&mut self, dialog: DialogEvent) {
        self.dialog_on_submit = Some(dialog);
    }

    pub fn set_fail_screenshots(&mut self, fail: bool) {
        self.fail_screenshots = fail;
    }

    pub fn set_fail_dialog_probe(&mut self, fail: bool) {
        self.fail_dialog_probe = fail;
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn scripts(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().screenshots.clone()
    }

    pub fn submitted_values(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().submitted_values.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn handle_submit(&self, state: &mut MockState) {
        state.submitted_values.push(state.values.clone());

        if let Some(ref dialog) = self.dialog_on_submit {
            state.dialogs.push(dialog.clone());
        }

        if let Some(ref validated) = self.validated_ids {
            let all_filled = validated
                .iter()
                .all(|id| state.values.get(id).map(|v| !v.is_empty()).unwrap_or(false));
            if all_filled {
                // Accepted: the form page is replaced by a confirmation page
                state.present.clear();
            }
        }
    }

    fn current_source(&self, state: &MockState) -> String {
        let mut source = String::from("<html><body><div class=\"wpforms-container\">");
        for id in &self.page_ids {
            source.push_str(&format!("<input id=\"{}\" value=\"\">", id));
        }
        source.push_str("</div>");
        if self.reflect_submissions {
            if let Some(last) = state.submitted_values.last() {
                for value in last.values() {
                    source.push_str(&format!("<p>{}</p>", value));
                }
            }
        }
        source.push_str("</body></html>");
        source
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.present = self.page_ids.iter().cloned().collect();
        state.values.clear();
        state.dialogs.clear();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        match self.url {
            Some(ref url) => Ok(url.clone()),
            None => Ok(state.navigations.last().cloned().unwrap_or_default()),
        }
    }

    async fn title(&self) -> Result<String> {
        Ok(self.title.clone())
    }

    async fn wait_for_element(&self, id: &str, _timeout_ms: u64) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.present.contains(id))
    }

    async fn attribute(&self, id: &str, name: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if !state.present.contains(id) {
            bail!("Element not found: #{}", id);
        }
        Ok(self
            .attributes
            .get(&(id.to_string(), name.to_string()))
            .cloned())
    }

    async fn fill(&self, id: &str, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.present.contains(id) {
            bail!("Element not found: #{}", id);
        }
        state.values.insert(id.to_string(), text.to_string());
        Ok(())
    }

    async fn click(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.present.contains(id) {
            bail!("Element not found: #{}", id);
        }
        state.clicks.push(id.to_string());
        Ok(())
    }

    async fn exec_script(&self, id: &str, script: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.present.contains(id) {
            bail!("Element not found: #{}", id);
        }
        state.scripts.push((id.to_string(), script.to_string()));

        if script.contains("el.click()") && id == self.submit_id {
            self.handle_submit(&mut state);
        }
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        Ok(self.current_source(&state))
    }

    async fn fired_dialogs(&self) -> Result<Vec<DialogEvent>> {
        if self.fail_dialog_probe {
            bail!("dialog probe unavailable");
        }
        let state = self.state.lock().unwrap();
        Ok(state.dialogs.clone())
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        if self.fail_screenshots {
            bail!("screenshot capture unavailable");
        }
        std::fs::write(path, b"png")?;
        let mut state = self.state.lock().unwrap();
        state.screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        Ok(())
    }
}
