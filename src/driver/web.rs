//! Browser session implementation on Playwright
//!
//! One session per suite run: a single browser, context and page shared by
//! every scenario. Native dialogs are observed through an init script that
//! wraps `alert`/`confirm`/`prompt` into an in-page buffer, installed at the
//! context level so it survives navigations (the automation layer would
//! otherwise auto-dismiss dialogs before anyone can see them).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use playwright::api::{Browser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::common::{self, PollConfig};
use crate::driver::traits::{BrowserDriver, DialogEvent};
use crate::utils::config::SuiteConfig;

/// Installed on every new document before page scripts run.
const DIALOG_HOOK: &str = r#"
(() => {
    if (window.__cyberhotDialogHook) return;
    window.__cyberhotDialogHook = true;
    window.__cyberhotDialogs = [];
    for (const kind of ['alert', 'confirm', 'prompt']) {
        window[kind] = (message) => {
            window.__cyberhotDialogs.push({
                kind: kind,
                message: message === undefined ? '' : String(message),
            });
            if (kind === 'confirm') return true;
            if (kind === 'prompt') return null;
        };
    }
})();
"#;

/// Browser engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            _ => bail!("Unknown browser engine: {}", name),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

/// Session attributes for the shared browser instance
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser_kind: BrowserKind,
    pub headless: bool,
    pub accept_insecure_certs: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// System browser binary to launch instead of the managed build.
    /// Only meaningful for Chromium, the other engines need their own builds.
    pub executable: Option<PathBuf>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            browser_kind: BrowserKind::Chromium,
            headless: true,
            accept_insecure_certs: true,
            viewport_width: 1920,
            viewport_height: 1080,
            executable: None,
        }
    }
}

impl WebDriverConfig {
    pub fn from_suite(config: &SuiteConfig, kind: BrowserKind) -> Self {
        Self {
            browser_kind: kind,
            headless: config.headless,
            accept_insecure_certs: config.accept_insecure_certs,
            viewport_width: config.window_width,
            viewport_height: config.window_height,
            executable: None,
        }
    }
}

/// Playwright-backed driver
pub struct PlaywrightDriver {
    // Held so the browser process outlives the session even though nothing
    // calls through them after setup.
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    #[allow(dead_code)]
    browser: Arc<Browser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    config: WebDriverConfig,
}

impl PlaywrightDriver {
    /// Create the shared browser session
    pub async fn new(config: WebDriverConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser_type = match config.browser_kind {
            BrowserKind::Chromium => playwright.chromium(),
            BrowserKind::Firefox => playwright.firefox(),
            BrowserKind::Webkit => playwright.webkit(),
        };

        // Sandboxed Chromium refuses to start under root, and CI containers
        // tend to have a tiny /dev/shm
        let mut args: Vec<String> = Vec::new();
        if config.browser_kind == BrowserKind::Chromium {
            args.extend(
                [
                    "--no-sandbox",
                    "--disable-setuid-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-gpu",
                ]
                .iter()
                .map(|s| s.to_string()),
            );
            if config.accept_insecure_certs {
                args.push("--ignore-certificate-errors".to_string());
            }
        }

        let mut launcher = browser_type.launcher();
        launcher = launcher.headless(config.headless);
        if !args.is_empty() {
            launcher = launcher.args(&args);
        }
        if let Some(ref path) = config.executable {
            log::info!(
                "Launching {} from {}",
                config.browser_kind.as_str(),
                path.display()
            );
            launcher = launcher.executable(path);
        }

        let browser = launcher
            .launch()
            .await
            .with_context(|| format!("Failed to launch {}", config.browser_kind.as_str()))?;

        let context = browser
            .context_builder()
            .ignore_https_errors(config.accept_insecure_certs)
            .build()
            .await
            .context("Failed to create browser context")?;

        context
            .add_init_script(DIALOG_HOOK)
            .await
            .context("Failed to install dialog hook")?;

        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        log::debug!(
            "Browser session ready: {} (headless: {})",
            config.browser_kind.as_str(),
            config.headless
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            config,
        })
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    fn name(&self) -> &str {
        self.config.browser_kind.as_str()
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        let url: String = page.evaluate("() => window.location.href", ()).await?;
        Ok(url)
    }

    async fn title(&self) -> Result<String> {
        let page = self.page.lock().await;
        let title: String = page.evaluate("() => document.title", ()).await?;
        Ok(title)
    }

    async fn wait_for_element(&self, id: &str, timeout_ms: u64) -> Result<bool> {
        let sel = format!("#{}", id);
        let found = common::wait_until(
            || {
                let sel = sel.clone();
                async move {
                    let page = self.page.lock().await;
                    matches!(page.query_selector(&sel).await, Ok(Some(_)))
                }
            },
            PollConfig::with_timeout(timeout_ms),
        )
        .await;
        Ok(found)
    }

    async fn attribute(&self, id: &str, name: &str) -> Result<Option<String>> {
        let page = self.page.lock().await;
        let sel = format!("#{}", id);
        if page.query_selector(&sel).await?.is_none() {
            bail!("Element not found: #{}", id);
        }

        let value: Option<String> = page
            .evaluate(
                "args => { const el = document.getElementById(args.id); return el ? el.getAttribute(args.name) : null; }",
                serde_json::json!({ "id": id, "name": name }),
            )
            .await?;
        Ok(value)
    }

    async fn fill(&self, id: &str, text: &str) -> Result<()> {
        let page = self.page.lock().await;
        let sel = format!("#{}", id);
        match page.query_selector(&sel).await? {
            Some(el) => {
                el.fill_builder(text).fill().await?;
                Ok(())
            }
            None => bail!("Element not found: #{}", id),
        }
    }

    async fn click(&self, id: &str) -> Result<()> {
        let page = self.page.lock().await;
        let sel = format!("#{}", id);
        page.click_builder(&sel)
            .click()
            .await
            .with_context(|| format!("Failed to click: {}", sel))?;
        Ok(())
    }

    async fn exec_script(&self, id: &str, script: &str) -> Result<()> {
        let page = self.page.lock().await;
        let js = format!(
            "args => {{ const el = document.getElementById(args.id); if (!el) return false; ({})(el); return true; }}",
            script
        );
        let found: bool = page.evaluate(&js, serde_json::json!({ "id": id })).await?;
        if !found {
            bail!("Element not found: #{}", id);
        }
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        let page = self.page.lock().await;
        let html = page.content().await?;
        Ok(html)
    }

    async fn fired_dialogs(&self) -> Result<Vec<DialogEvent>> {
        let page = self.page.lock().await;
        let dialogs: Vec<DialogEvent> = page
            .evaluate("() => window.__cyberhotDialogs || []", ())
            .await?;
        Ok(dialogs)
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        let page = self.page.lock().await;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // Parking the page is enough; the browser process shuts down when the
        // session's Arc handles drop.
        let page = self.page.lock().await;
        page.goto_builder("about:blank").goto().await.ok();
        Ok(())
    }
}
