use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Path of the optional configuration file, relative to the working directory.
const CONFIG_FILE: &str = "config.toml";

/// Program configuration.
///
/// All timeouts and pauses below were tuned empirically against the portal;
/// they are deliberately configuration, not constants, so a slower host can
/// be accommodated without a rebuild.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal base URL (no trailing slash)
    pub portal_base_url: String,
    /// Login page path
    pub login_path: String,
    /// Listing view path
    pub listing_path: String,
    /// Per-item detail view path (the item id is appended)
    pub detail_path: String,
    /// Stable DOM id of the export trigger on the detail view
    pub export_button_id: String,
    /// Label of the login submit button
    pub login_button_label: String,
    /// Menu labels clicked in order to reach the listing view
    pub menu_labels: Vec<String>,
    /// Page-title substring that marks the portal's fatal-error screen
    pub fatal_title_marker: String,
    /// Portal username (prefer the PORTAL_USERNAME env var)
    pub username: String,
    /// Portal password (prefer the PORTAL_PASSWORD env var)
    pub password: String,
    /// Directory the browser downloads into and reports are filed under
    pub download_dir: String,
    /// Path of the JSON history ledger
    pub history_file: String,
    /// Minimum period (inclusive, "YYYY/MM"); older items are skipped
    pub min_period: String,
    /// Outer attempts per work item
    pub max_attempts: u32,
    /// Re-process items already present in the history ledger
    pub force_reattempt: bool,
    /// Attach to a running browser on this debug port instead of launching
    pub attach_port: Option<u16>,
    /// Explicit Chrome/Chromium executable for headless launch
    pub chrome_executable: Option<String>,
    /// Deadline for a triggered export to materialize as a file
    pub file_wait_secs: u64,
    /// Poll interval for element and file waits
    pub poll_interval_ms: u64,
    /// Bounded wait for listing elements (links, login form, menus)
    pub element_wait_secs: u64,
    /// Bounded wait for the export trigger (shorter: absence means no data)
    pub export_wait_secs: u64,
    /// Pause after dismissing an interruption
    pub popup_settle_ms: u64,
    /// Pause after clicking into a detail view
    pub nav_settle_secs: u64,
    /// Pause after a full page reload
    pub reload_settle_secs: u64,
    /// Pause between attempts of the same item
    pub retry_pause_secs: u64,
    /// Pause after submitting the login form
    pub login_settle_secs: u64,
    /// Pause after each menu click
    pub menu_settle_secs: u64,
    /// Short settle pause (scroll-into-view, navigate-back)
    pub short_pause_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_base_url: "https://portal.example.com".to_string(),
            login_path: "/Acesso/Entrar".to_string(),
            listing_path: "/FolhaPagamento".to_string(),
            detail_path: "/FolhaPagamento/Consultar".to_string(),
            export_button_id: "exportarRelatorioFolhaPagamento".to_string(),
            login_button_label: "Entrar".to_string(),
            menu_labels: vec!["Folha".to_string(), "Folha Pagamento".to_string()],
            fatal_title_marker: "Erro".to_string(),
            username: String::new(),
            password: String::new(),
            download_dir: "reports_raw".to_string(),
            history_file: "download_history.json".to_string(),
            min_period: "2025/12".to_string(),
            max_attempts: 3,
            force_reattempt: false,
            attach_port: None,
            chrome_executable: None,
            file_wait_secs: 60,
            poll_interval_ms: 1000,
            element_wait_secs: 15,
            export_wait_secs: 8,
            popup_settle_ms: 2000,
            nav_settle_secs: 3,
            reload_settle_secs: 5,
            retry_pause_secs: 4,
            login_settle_secs: 5,
            menu_settle_secs: 4,
            short_pause_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration: `config.toml` if present, otherwise defaults,
    /// with environment variables applied on top.
    pub fn load() -> Result<Self> {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(crate::error::AppError::file_read_failed(CONFIG_FILE, e)),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a configuration from TOML text; unset fields fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PORTAL_BASE_URL") {
            self.portal_base_url = v;
        }
        if let Ok(v) = std::env::var("PORTAL_USERNAME") {
            self.username = v;
        }
        if let Ok(v) = std::env::var("PORTAL_PASSWORD") {
            self.password = v;
        }
        if let Ok(v) = std::env::var("DOWNLOAD_DIR") {
            self.download_dir = v;
        }
        if let Ok(v) = std::env::var("HISTORY_FILE") {
            self.history_file = v;
        }
        if let Ok(v) = std::env::var("MIN_PERIOD") {
            self.min_period = v;
        }
        if let Some(v) = std::env::var("MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()) {
            self.max_attempts = v;
        }
        if let Some(v) = std::env::var("FORCE_REATTEMPT").ok().and_then(|v| v.parse().ok()) {
            self.force_reattempt = v;
        }
        if let Some(v) = std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()) {
            self.attach_port = Some(v);
        }
        if let Ok(v) = std::env::var("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
    }

    // ========== Derived URLs ==========

    pub fn login_url(&self) -> String {
        format!("{}{}", self.portal_base_url, self.login_path)
    }

    pub fn listing_url(&self) -> String {
        format!("{}{}", self.portal_base_url, self.listing_path)
    }

    // ========== Duration accessors ==========

    pub fn file_wait(&self) -> Duration {
        Duration::from_secs(self.file_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn export_wait(&self) -> Duration {
        Duration::from_secs(self.export_wait_secs)
    }

    pub fn popup_settle(&self) -> Duration {
        Duration::from_millis(self.popup_settle_ms)
    }

    pub fn nav_settle(&self) -> Duration {
        Duration::from_secs(self.nav_settle_secs)
    }

    pub fn reload_settle(&self) -> Duration {
        Duration::from_secs(self.reload_settle_secs)
    }

    pub fn retry_pause(&self) -> Duration {
        Duration::from_secs(self.retry_pause_secs)
    }

    pub fn login_settle(&self) -> Duration {
        Duration::from_secs(self.login_settle_secs)
    }

    pub fn menu_settle(&self) -> Duration {
        Duration::from_secs(self.menu_settle_secs)
    }

    pub fn short_pause(&self) -> Duration {
        Duration::from_millis(self.short_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = Config::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.file_wait_secs, 60);
        assert_eq!(config.min_period, "2025/12");
        assert!(!config.force_reattempt);
        assert!(config.attach_port.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_unset_fields() {
        let config = Config::from_toml_str(
            r#"
            min_period = "2026/01"
            max_attempts = 5
            download_dir = "out"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.min_period, "2026/01");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.download_dir, "out");
        // untouched fields keep their defaults
        assert_eq!(config.file_wait_secs, 60);
        assert_eq!(config.export_button_id, "exportarRelatorioFolhaPagamento");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("max_attempts = \"three\"").is_err());
    }
}
