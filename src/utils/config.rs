use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// DOM identifiers of the form inputs under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldIds {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            first_name: "wpforms-2234-field_1".to_string(),
            last_name: "wpforms-2234-field_1-last".to_string(),
            email: "wpforms-2234-field_2".to_string(),
            message: "wpforms-2234-field_3".to_string(),
        }
    }
}

/// Suite configuration
///
/// Defaults target the known contact page. A YAML file (`--config`) overrides
/// individual keys; `CYBERHOT_*` environment variables override both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuiteConfig {
    /// Contact page URL
    pub contact_url: String,

    /// Substring the post-navigation URL must contain (matched case-insensitive)
    pub expected_url_fragment: String,

    /// Form input identifiers
    pub fields: FieldIds,

    /// Submit control identifier
    pub submit_id: String,

    /// Browser engine (chromium, firefox, webkit); auto-detected when unset
    pub browser: Option<String>,

    /// Run the browser headless
    pub headless: bool,

    /// Accept self-signed / invalid TLS certificates
    pub accept_insecure_certs: bool,

    /// Browser viewport width (px)
    pub window_width: u32,

    /// Browser viewport height (px)
    pub window_height: u32,

    /// Bounded wait for element presence (ms)
    pub presence_timeout_ms: u64,

    /// Bounded wait for the form to reappear after a blocked submit (ms)
    pub validation_timeout_ms: u64,

    /// Bounded wait for elements during the injection probe (ms)
    pub injection_timeout_ms: u64,

    /// Page load must complete within this ceiling (ms)
    pub page_load_ceiling_ms: u64,

    /// Directory for evidence screenshots and report artifacts
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            contact_url: "https://www.cyberhotsecurity.cecti.iesmontsia.cat/contact/".to_string(),
            expected_url_fragment: "contact".to_string(),
            fields: FieldIds::default(),
            submit_id: "wpforms-submit-2234".to_string(),
            browser: None,
            headless: true,
            accept_insecure_certs: true,
            window_width: 1920,
            window_height: 1080,
            presence_timeout_ms: 10000,
            validation_timeout_ms: 25000,
            injection_timeout_ms: 15000,
            page_load_ceiling_ms: 30000,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from an optional YAML file, then apply environment
    /// overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {}", p.display()))?;
                serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", p.display()))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CYBERHOT_CONTACT_URL") {
            if !url.is_empty() {
                self.contact_url = url;
            }
        }
        if let Ok(browser) = std::env::var("CYBERHOT_BROWSER") {
            if !browser.is_empty() {
                self.browser = Some(browser);
            }
        }
        if let Ok(headless) = std::env::var("CYBERHOT_HEADLESS") {
            self.headless = headless == "true" || headless == "1";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_known_page() {
        let config = SuiteConfig::default();
        assert!(config.contact_url.contains("contact"));
        assert_eq!(config.fields.first_name, "wpforms-2234-field_1");
        assert_eq!(config.fields.last_name, "wpforms-2234-field_1-last");
        assert_eq!(config.submit_id, "wpforms-submit-2234");
        assert!(config.headless);
        assert!(config.accept_insecure_certs);
        assert_eq!((config.window_width, config.window_height), (1920, 1080));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
contactUrl: "https://staging.example.test/contact/"
presenceTimeoutMs: 5000
fields:
  email: "custom-email-field"
"#;
        let config: SuiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.contact_url, "https://staging.example.test/contact/");
        assert_eq!(config.presence_timeout_ms, 5000);
        assert_eq!(config.fields.email, "custom-email-field");
        // Untouched keys fall back to defaults
        assert_eq!(config.fields.first_name, "wpforms-2234-field_1");
        assert_eq!(config.validation_timeout_ms, 25000);
        assert!(config.browser.is_none());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = SuiteConfig::load(None).unwrap();
        assert_eq!(config.expected_url_fragment, "contact");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "fields: [not, a, map]").unwrap();
        assert!(SuiteConfig::load(Some(&path)).is_err());
    }
}
