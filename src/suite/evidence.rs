//! Best-effort screenshot evidence. Capture failures are logged and
//! swallowed, they never fail a scenario.

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::driver::traits::BrowserDriver;

pub struct EvidenceSink {
    output_dir: PathBuf,
    captured: Mutex<Vec<PathBuf>>,
}

impl EvidenceSink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Capture a screenshot named `<slug>_<timestamp>.png` in the output
    /// directory. Returns the path on success, None on any failure.
    pub async fn capture(&self, driver: &dyn BrowserDriver, slug: &str) -> Option<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("{}_{}.png", slug, timestamp));

        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            log::warn!("Could not create evidence directory {}: {}", self.output_dir.display(), e);
            return None;
        }

        match driver.take_screenshot(&path).await {
            Ok(()) => {
                log::info!("Captured evidence: {}", path.display());
                self.captured.lock().unwrap().push(path.clone());
                Some(path)
            }
            Err(e) => {
                log::warn!("Could not capture screenshot {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Paths captured since the last drain, in capture order.
    pub fn drain_captured(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.captured.lock().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;

    #[tokio::test]
    async fn test_capture_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = EvidenceSink::new(dir.path());
        let driver = MockDriver::new(&["wpforms-2234-field_1"], "wpforms-submit-2234");

        let path = sink.capture(&driver, "xss_detected").await.unwrap();
        assert!(path.exists());

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("xss_detected_"));
        assert!(name.ends_with(".png"));

        let drained = sink.drain_captured();
        assert_eq!(drained, vec![path]);
        assert!(sink.drain_captured().is_empty());
    }

    #[tokio::test]
    async fn test_capture_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let sink = EvidenceSink::new(dir.path());
        let mut driver = MockDriver::new(&["wpforms-2234-field_1"], "wpforms-submit-2234");
        driver.set_fail_screenshots(true);

        assert!(sink.capture(&driver, "page_load").await.is_none());
        assert!(sink.drain_captured().is_empty());
    }
}
