//! Browser engine resolution and launch
//!
//! Maps user-facing browser names ("chrome", "edge", ...) onto the engines we
//! can actually launch, locates the matching executable on the host, and
//! assembles the CDP launch configuration.

use std::path::PathBuf;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Handler;
use tracing::{info, warn};

use super::BrowserError;

/// Browser engines the factory can launch.
///
/// User-supplied names are resolved with [`BrowserKind::resolve`]; internally
/// only this closed set exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    /// Plain Chromium / Google Chrome
    Chromium,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge (Chromium engine, Edge channel)
    Msedge,
}

impl BrowserKind {
    /// Resolve a user-facing browser name to an engine.
    ///
    /// Case-insensitive and trimmed. "chrome" is an alias for Chromium,
    /// "edge" for Msedge. Unknown or empty names fall back to Chromium
    /// silently - that is the documented policy, not an error.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "firefox" => Self::Firefox,
            "msedge" | "edge" => Self::Msedge,
            "chromium" | "chrome" => Self::Chromium,
            _ => Self::Chromium,
        }
    }

    /// Canonical engine name (after alias resolution)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Msedge => "msedge",
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Launch options for a browser session
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    /// Explicit path to the browser executable (auto-detected when None)
    pub executable: Option<String>,
    /// Run without a visible window
    pub headless: bool,
    /// User data directory (temp dir keyed by session id when None)
    pub user_data_dir: Option<String>,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            user_data_dir: None,
            window_width: 1280,
            window_height: 900,
        }
    }
}

impl LaunchOptions {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set executable path
    pub fn executable(mut self, path: Option<String>) -> Self {
        self.executable = path;
        self
    }
}

/// Find the executable for the given engine on the host system.
fn find_executable(kind: BrowserKind) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(target_os = "windows") {
        let program_files = std::env::var("ProgramFiles")
            .unwrap_or_else(|_| r"C:\Program Files".to_string());
        match kind {
            BrowserKind::Chromium => vec![
                PathBuf::from(format!(r"{program_files}\Google\Chrome\Application\chrome.exe")),
                PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
            ],
            BrowserKind::Firefox => vec![
                PathBuf::from(format!(r"{program_files}\Mozilla Firefox\firefox.exe")),
            ],
            BrowserKind::Msedge => vec![
                PathBuf::from(r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe"),
                PathBuf::from(format!(r"{program_files}\Microsoft\Edge\Application\msedge.exe")),
            ],
        }
    } else if cfg!(target_os = "macos") {
        match kind {
            BrowserKind::Chromium => vec![
                PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
                PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
            ],
            BrowserKind::Firefox => vec![
                PathBuf::from("/Applications/Firefox.app/Contents/MacOS/firefox"),
            ],
            BrowserKind::Msedge => vec![
                PathBuf::from("/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"),
            ],
        }
    } else {
        match kind {
            BrowserKind::Chromium => vec![
                PathBuf::from("/usr/bin/chromium"),
                PathBuf::from("/usr/bin/chromium-browser"),
                PathBuf::from("/usr/bin/google-chrome"),
                PathBuf::from("/usr/bin/google-chrome-stable"),
            ],
            BrowserKind::Firefox => vec![
                PathBuf::from("/usr/bin/firefox"),
                PathBuf::from("/usr/bin/firefox-esr"),
            ],
            BrowserKind::Msedge => vec![
                PathBuf::from("/usr/bin/microsoft-edge"),
                PathBuf::from("/usr/bin/microsoft-edge-stable"),
            ],
        }
    };

    candidates.into_iter().find(|p| p.exists())
}

/// Launch a browser of the given kind.
///
/// Returns the browser handle plus the CDP event handler, which the caller
/// must drive (the session spawns it on a background task). Launch failure is
/// an error; an unknown *name* never reaches here - `resolve` has already
/// mapped it to Chromium.
pub async fn launch(
    kind: BrowserKind,
    options: &LaunchOptions,
) -> Result<(Browser, Handler), BrowserError> {
    let mut builder = BrowserConfig::builder();

    // Headless is the builder default; with_head opens a visible window.
    if !options.headless {
        builder = builder.with_head();
    }

    if let Some(ref path) = options.executable {
        builder = builder.chrome_executable(path);
    } else if let Some(path) = find_executable(kind) {
        info!("Auto-detected {} at: {}", kind, path.display());
        builder = builder.chrome_executable(path);
    } else {
        // Edge is the Chromium engine under another channel; a plain Chromium
        // install can stand in for a missing msedge binary.
        if kind == BrowserKind::Msedge {
            if let Some(path) = find_executable(BrowserKind::Chromium) {
                warn!("msedge not found, launching Chromium engine at: {}", path.display());
                builder = builder.chrome_executable(path);
            } else {
                return Err(BrowserError::LaunchFailed(format!(
                    "No executable found for browser '{kind}'. Install it or pass an explicit path."
                )));
            }
        } else {
            return Err(BrowserError::LaunchFailed(format!(
                "No executable found for browser '{kind}'. Install it or pass an explicit path."
            )));
        }
    }

    if let Some(ref dir) = options.user_data_dir {
        let _ = std::fs::create_dir_all(dir);
        builder = builder.user_data_dir(dir);
    }

    builder = builder
        .window_size(options.window_width, options.window_height)
        // Required when running as root (e.g., in Docker or CI)
        .arg("--no-sandbox")
        .arg("--disable-notifications")
        .arg("--no-default-browser-check");

    let config = builder
        .build()
        .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

    Browser::launch(config)
        .await
        .map_err(|e| BrowserError::LaunchFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_names() {
        assert_eq!(BrowserKind::resolve("chromium"), BrowserKind::Chromium);
        assert_eq!(BrowserKind::resolve("firefox"), BrowserKind::Firefox);
        assert_eq!(BrowserKind::resolve("msedge"), BrowserKind::Msedge);
    }

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(BrowserKind::resolve("chrome"), BrowserKind::Chromium);
        assert_eq!(BrowserKind::resolve("edge"), BrowserKind::Msedge);
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_trimmed() {
        assert_eq!(BrowserKind::resolve("  FireFox "), BrowserKind::Firefox);
        assert_eq!(BrowserKind::resolve("CHROME"), BrowserKind::Chromium);
        assert_eq!(BrowserKind::resolve("Edge"), BrowserKind::Msedge);
        assert_eq!(BrowserKind::resolve("MsEdge"), BrowserKind::Msedge);
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_chromium() {
        assert_eq!(BrowserKind::resolve(""), BrowserKind::Chromium);
        assert_eq!(BrowserKind::resolve("unknown"), BrowserKind::Chromium);
        assert_eq!(BrowserKind::resolve("safari"), BrowserKind::Chromium);
        assert_eq!(BrowserKind::resolve("   "), BrowserKind::Chromium);
    }
}
