//! XYZ Bank end-to-end UI test library
//!
//! Page objects over CDP browser automation for the XYZ Bank demo
//! application, exposed as a keyword surface for a test runner. One browser
//! session per suite, created lazily and torn down explicitly.

pub mod browser;
pub mod data;
pub mod library;
pub mod pages;

use std::path::PathBuf;

use tracing::info;

use browser::BrowserKind;
pub use library::{BankingLibrary, FlowError};

/// Default base URL for the XYZ Bank demo
pub const DEFAULT_BASE_URL: &str =
    "https://www.globalsqa.com/angularJs-protractor/BankingProject/#/login";

/// Library configuration
///
/// String-typed inputs (browser name, headless flag) are coerced here, at
/// the external-interface edge; internally only the strict types exist.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankConfig {
    /// Base URL of the application under test (trailing slash trimmed)
    pub base_url: String,
    /// Browser engine to launch
    #[serde(with = "browser_name")]
    pub browser: BrowserKind,
    /// Run without a visible window
    pub headless: bool,
}

/// Serialize/deserialize `BrowserKind` through its user-facing name, so a
/// config document round-trips through the same alias table as the
/// constructor arguments.
mod browser_name {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::browser::BrowserKind;

    pub fn serialize<S: Serializer>(kind: &BrowserKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(kind.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BrowserKind, D::Error> {
        let name = String::deserialize(d)?;
        Ok(BrowserKind::resolve(&name))
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserKind::Chromium,
            headless: true,
        }
    }
}

/// Coerce a string-typed boolean flag the way the runner passes them.
fn parse_bool_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl BankConfig {
    /// Build a config from the constructor-level string options.
    ///
    /// Empty base URL falls back to the default; the browser name goes
    /// through the alias table; the headless flag accepts "true"/"1"/"yes"
    /// (any case).
    pub fn from_options(base_url: &str, browser: &str, headless: &str) -> Self {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        Self {
            base_url: base.trim_end_matches('/').to_string(),
            browser: BrowserKind::resolve(browser),
            headless: parse_bool_flag(headless),
        }
    }

    /// Apply `XYZBANK_BASE_URL`, `XYZBANK_BROWSER` and `XYZBANK_HEADLESS`
    /// environment overrides on top of this config.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("XYZBANK_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url.trim_end_matches('/').to_string();
            }
        }
        if let Ok(name) = std::env::var("XYZBANK_BROWSER") {
            self.browser = BrowserKind::resolve(&name);
        }
        if let Ok(flag) = std::env::var("XYZBANK_HEADLESS") {
            self.headless = parse_bool_flag(&flag);
        }
        self
    }

    /// Set the base URL (trailing slash trimmed)
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the browser by user-facing name
    pub fn browser(mut self, name: &str) -> Self {
        self.browser = BrowserKind::resolve(name);
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

/// Get the log directory path
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("xyzbank-tester").join("logs"))
}

/// Initialize logging (console layer plus optional daily-rolling file layer).
///
/// Keep the returned guard alive for the program's lifetime or buffered file
/// output is lost.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "xyzbank-tester.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Log files saved to: {}", log_dir.display());
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options_defaults_and_trimming() {
        let config = BankConfig::from_options("", "chromium", "true");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.headless);

        let config = BankConfig::from_options("https://bank.example/app/", "chrome", "false");
        assert_eq!(config.base_url, "https://bank.example/app");
        assert_eq!(config.browser, BrowserKind::Chromium);
        assert!(!config.headless);
    }

    #[test]
    fn test_headless_string_coercion() {
        for truthy in ["true", "TRUE", "1", "yes", " Yes "] {
            assert!(parse_bool_flag(truthy), "{truthy:?} should coerce to true");
        }
        for falsy in ["false", "", "0", "no", "nope"] {
            assert!(!parse_bool_flag(falsy), "{falsy:?} should coerce to false");
        }
    }

    #[test]
    fn test_browser_alias_at_config_edge() {
        assert_eq!(
            BankConfig::from_options("", "edge", "true").browser,
            BrowserKind::Msedge
        );
        assert_eq!(
            BankConfig::from_options("", "whatever", "true").browser,
            BrowserKind::Chromium
        );
    }

    #[test]
    fn test_config_serde_round_trips_browser_name() {
        let config = BankConfig::default().browser("edge");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"msedge\""), "got: {json}");

        let back: BankConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.browser, BrowserKind::Msedge);
    }
}
