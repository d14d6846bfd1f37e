pub mod common;
#[cfg(test)]
pub mod mock;
pub mod traits;
pub mod web;

use anyhow::Result;
use std::path::PathBuf;

use crate::driver::traits::BrowserDriver;
use crate::driver::web::{BrowserKind, PlaywrightDriver, WebDriverConfig};
use crate::utils::binary_resolver;
use crate::utils::config::SuiteConfig;

/// Pick a browser engine and start a driver session for it.
///
/// An explicit browser name in the config wins. Otherwise discovery prefers
/// a system Firefox, then a system Chromium, then the Playwright-managed
/// browser cache. Failure here means the environment cannot run browser
/// scenarios at all, which the runner reports as skipped rather than failed.
pub async fn resolve(config: &SuiteConfig) -> Result<Box<dyn BrowserDriver>> {
    let (kind, executable) = match config.browser.as_deref() {
        Some(name) => {
            let kind = BrowserKind::parse(name)?;
            log::info!("Using requested browser engine: {}", kind.as_str());
            (kind, system_executable(kind))
        }
        None => discover_engine()?,
    };

    let mut driver_config = WebDriverConfig::from_suite(config, kind);
    driver_config.executable = executable;
    let driver = PlaywrightDriver::new(driver_config).await?;
    Ok(Box::new(driver))
}

/// System binary usable by the given engine, if any. Only Chromium can run
/// from an ordinary system install; Firefox and WebKit need the builds the
/// automation layer manages itself.
fn system_executable(kind: BrowserKind) -> Option<PathBuf> {
    if kind != BrowserKind::Chromium {
        return None;
    }
    if let Some(path) = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
        .ok()
        .map(PathBuf::from)
    {
        return Some(path);
    }
    binary_resolver::find_chromium().0
}

fn discover_engine() -> Result<(BrowserKind, Option<PathBuf>)> {
    let (firefox, firefox_checked) = binary_resolver::find_firefox();
    if let Some(path) = firefox {
        log::info!("Using Firefox at {}", path.display());
        return Ok((BrowserKind::Firefox, None));
    }

    let (chromium, chromium_checked) = binary_resolver::find_chromium();
    if let Some(path) = chromium {
        log::info!("Using Chromium at {}", path.display());
        return Ok((BrowserKind::Chromium, Some(path)));
    }

    if let Some(cache) = binary_resolver::managed_browser_cache() {
        log::info!("Using Playwright-managed browsers from {}", cache.display());
        return Ok((BrowserKind::Chromium, None));
    }

    anyhow::bail!(
        "No browser found. Checked for Firefox in [{}] and Chromium in [{}]. \
         Install one of them or run `playwright install`.",
        firefox_checked.join(", "),
        chromium_checked.join(", ")
    );
}
