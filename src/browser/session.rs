//! Browser session management
//!
//! Owns one launched browser process and one page, and exposes the UI action
//! primitives the page objects are built from. One session per test suite;
//! the library facade creates it lazily and tears it down explicitly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::factory::{self, BrowserKind, LaunchOptions};
use super::BrowserError;

/// Default per-action timeout in seconds
const ACTION_TIMEOUT_SECS: u64 = 30;
/// Navigation gets a longer budget than element actions
const NAVIGATION_TIMEOUT_SECS: u64 = 60;
/// Poll interval for wait_for_selector
const POLL_INTERVAL_MS: u64 = 100;

/// Element lifecycle states wait_for_selector can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// A live browser session: one process, one page.
pub struct BrowserSession {
    /// Display id, used in log lines
    pub id: String,
    /// The browser instance
    browser: Arc<RwLock<Option<Browser>>>,
    /// Current active page
    page: Arc<RwLock<Option<Page>>>,
    /// Whether the session is alive (flipped by the handler task on disconnect)
    alive: Arc<AtomicBool>,
}

/// Embed a string into a JavaScript snippet as a quoted literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl BrowserSession {
    /// Launch a new browser session.
    ///
    /// Spawns the browser process, drives its CDP event stream on a
    /// background task, and adopts the initial blank tab as the session page
    /// (extra tabs are closed).
    pub async fn launch(kind: BrowserKind, options: LaunchOptions) -> Result<Self, BrowserError> {
        let session_id = format!("suite-{}", &Uuid::new_v4().simple().to_string()[..8]);

        let mut options = options;
        if options.user_data_dir.is_none() {
            let dir = std::env::temp_dir()
                .join("xyzbank-tester")
                .join("browser_data")
                .join(&session_id);
            options.user_data_dir = Some(dir.to_string_lossy().to_string());
        }

        info!(
            "Launching browser session {} ({}, headless: {})",
            session_id, kind, options.headless
        );

        let (browser, mut handler) = factory::launch(kind, &options).await?;

        // When the handler stream ends the browser has disconnected or crashed.
        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive.clone();
        let handler_session_id = session_id.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("Session {} handler error: {}", handler_session_id, err);
                }
            }
            warn!(
                "Session {} browser disconnected (event handler ended)",
                handler_session_id
            );
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // Adopt the tab the browser opened with; close any extras.
        let page = {
            let mut pages = browser
                .pages()
                .await
                .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

            let main_page = if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?
            };

            for extra_page in pages {
                debug!("Closing extra blank tab");
                let _ = extra_page.close().await;
            }

            main_page
        };

        info!("Browser session {} created", session_id);

        Ok(Self {
            id: session_id,
            browser: Arc::new(RwLock::new(Some(browser))),
            page: Arc::new(RwLock::new(Some(page))),
            alive,
        })
    }

    /// Check if the session is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    async fn page_handle(&self) -> Result<Page, BrowserError> {
        self.page
            .read()
            .await
            .clone()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))
    }

    /// Navigate to a URL and wait for the document to load.
    pub async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let page = self.page_handle().await?;

        debug!("Session {} navigating to: {}", self.id, url);
        tokio::time::timeout(
            Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
            page.goto(url),
        )
        .await
        .map_err(|_| BrowserError::Timeout(format!("Navigation to {url} timed out")))?
        .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        tokio::time::timeout(
            Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
            page.wait_for_navigation(),
        )
        .await
        .map_err(|_| BrowserError::Timeout(format!("Load of {url} timed out")))?
        .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    /// Get the current URL
    pub async fn current_url(&self) -> Result<String, BrowserError> {
        let page = self.page_handle().await?;

        page.url()
            .await
            .map_err(|e| BrowserError::ConnectionLost(e.to_string()))?
            .ok_or_else(|| BrowserError::ConnectionLost("No URL".into()))
    }

    /// Find an element once it is attached to the DOM.
    ///
    /// CDP's querySelector does not wait the way higher-level drivers do, so
    /// every primitive polls for attachment first; an element that never
    /// appears surfaces as a timeout, not a retry loop around the action.
    async fn find_element(
        &self,
        selector: &str,
    ) -> Result<chromiumoxide::Element, BrowserError> {
        self.wait_for_selector(
            selector,
            ElementState::Attached,
            Duration::from_secs(ACTION_TIMEOUT_SECS),
        )
        .await?;

        let page = self.page_handle().await?;
        page.find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{selector}: {e}")))
    }

    /// Click the element matching a CSS selector.
    pub async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self.find_element(selector).await?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(())
    }

    /// Fill the input matching a CSS selector: focus, clear, type.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<(), BrowserError> {
        let element = self.find_element(selector).await?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        // Clear any previous value so fill semantics are replace, not append
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        element
            .type_str(value)
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(())
    }

    /// Return the inner text of the first element matching a CSS selector.
    pub async fn text(&self, selector: &str) -> Result<String, BrowserError> {
        let element = self.find_element(selector).await?;

        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(text.unwrap_or_default())
    }

    /// Return the inner text of the LAST element matching a CSS selector.
    ///
    /// Some views repeat a cell per account row; the active one is last.
    pub async fn last_text(&self, selector: &str) -> Result<String, BrowserError> {
        self.wait_for_selector(
            selector,
            ElementState::Attached,
            Duration::from_secs(ACTION_TIMEOUT_SECS),
        )
        .await?;

        let script = format!(
            r#"
            (function() {{
                const nodes = document.querySelectorAll({sel});
                if (!nodes.length) return null;
                return nodes[nodes.length - 1].innerText;
            }})()
            "#,
            sel = js_string(selector)
        );

        match self.execute_js(&script).await? {
            serde_json::Value::String(text) => Ok(text),
            serde_json::Value::Null => Err(BrowserError::ElementNotFound(selector.to_string())),
            other => Ok(other.to_string()),
        }
    }

    /// Return an attribute of the first element matching a CSS selector.
    pub async fn attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let element = self.find_element(selector).await?;

        element
            .attribute(name)
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))
    }

    /// Check whether the element matching a CSS selector is attached and visible.
    pub async fn is_visible(&self, selector: &str) -> Result<bool, BrowserError> {
        let (attached, visible) = self.query_state(selector).await?;
        Ok(attached && visible)
    }

    /// Count elements matching a CSS selector.
    pub async fn count(&self, selector: &str) -> Result<usize, BrowserError> {
        let script = format!(
            "document.querySelectorAll({sel}).length",
            sel = js_string(selector)
        );
        let value = self.execute_js(&script).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    /// Wait until the element matching a CSS selector reaches the given state.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        state: ElementState,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let (attached, visible) = self.query_state(selector).await?;
            let reached = match state {
                ElementState::Visible => attached && visible,
                ElementState::Hidden => !attached || !visible,
                ElementState::Attached => attached,
                ElementState::Detached => !attached,
            };
            if reached {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "Waiting for {selector} to become {state:?} timed out"
                )));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    async fn query_state(&self, selector: &str) -> Result<(bool, bool), BrowserError> {
        let script = format!(
            r#"
            (function() {{
                const el = document.querySelector({sel});
                if (!el) return {{ attached: false, visible: false }};
                const style = window.getComputedStyle(el);
                const visible =
                    !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) &&
                    style.visibility !== 'hidden';
                return {{ attached: true, visible: visible }};
            }})()
            "#,
            sel = js_string(selector)
        );

        let result = self.execute_js(&script).await?;
        let attached = result
            .get("attached")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let visible = result
            .get("visible")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok((attached, visible))
    }

    /// Select an option in a `<select>` by its visible label and fire the
    /// change event the app's bindings listen for.
    pub async fn select_option_by_label(
        &self,
        selector: &str,
        label: &str,
    ) -> Result<(), BrowserError> {
        self.wait_for_selector(
            selector,
            ElementState::Attached,
            Duration::from_secs(ACTION_TIMEOUT_SECS),
        )
        .await?;

        let script = format!(
            r#"
            (function() {{
                const sel = document.querySelector({sel});
                if (!sel) return {{ ok: false, error: 'select not found' }};
                const wanted = {label};
                const option = Array.from(sel.options)
                    .find(o => o.label.trim() === wanted || o.text.trim() === wanted);
                if (!option) return {{ ok: false, error: 'option not found: ' + wanted }};
                sel.value = option.value;
                sel.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return {{ ok: true }};
            }})()
            "#,
            sel = js_string(selector),
            label = js_string(label),
        );

        let result = self.execute_js(&script).await?;
        if result.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let error = result
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(BrowserError::ElementNotFound(format!("{selector}: {error}")));
        }
        Ok(())
    }

    /// Execute JavaScript on the page with the default action timeout.
    pub async fn execute_js(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        self.execute_js_with_timeout(script, ACTION_TIMEOUT_SECS).await
    }

    /// Execute JavaScript on the page with a custom timeout (in seconds).
    pub async fn execute_js_with_timeout(
        &self,
        script: &str,
        timeout_secs: u64,
    ) -> Result<serde_json::Value, BrowserError> {
        let page = self.page_handle().await?;

        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            page.evaluate(script),
        )
        .await
        .map_err(|_| {
            BrowserError::Timeout(format!("JavaScript execution timed out after {timeout_secs}s"))
        })?
        .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Fixed delay, letting UI state settle between an action and its check.
    pub async fn wait_millis(&self, milliseconds: u64) {
        tokio::time::sleep(Duration::from_millis(milliseconds)).await;
    }

    /// Start watching for the next JavaScript dialog (alert/confirm/prompt).
    ///
    /// The dialog is accepted automatically as soon as it opens; its message
    /// is retrieved from the returned watcher. Subscribe BEFORE triggering
    /// the action that raises the dialog.
    pub async fn watch_dialog(&self) -> Result<DialogWatcher, BrowserError> {
        let page = self.page_handle().await?;

        let mut events = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        let accept_page = page.clone();
        let session_id = self.id.clone();
        tokio::spawn(async move {
            if let Some(event) = events.next().await {
                let message = event.message.clone();
                debug!("Session {} dialog opened: {}", session_id, message);
                if let Err(e) = accept_page
                    .execute(HandleJavaScriptDialogParams::new(true))
                    .await
                {
                    warn!("Session {} failed to accept dialog: {}", session_id, e);
                }
                let _ = tx.send(message);
            }
        });

        Ok(DialogWatcher { rx })
    }

    /// Close the browser session.
    ///
    /// Idempotent - the handles are taken out on the first call and later
    /// calls find nothing to do. Teardown failures are ignored: the goal is
    /// best-effort cleanup, not an error report.
    pub async fn close(&self) {
        self.alive.store(false, Ordering::Relaxed);

        {
            let mut page = self.page.write().await;
            if let Some(p) = page.take() {
                let _ = p.close().await;
            }
        }

        {
            let mut browser = self.browser.write().await;
            if let Some(mut b) = browser.take() {
                // Graceful close first, then force kill so no child process
                // outlives the suite.
                let _ = b.close().await;
                let _ = b.kill().await;
                info!("Browser session {} closed", self.id);
            }
        }
    }
}

/// One-shot receiver for a captured dialog message.
pub struct DialogWatcher {
    rx: oneshot::Receiver<String>,
}

impl DialogWatcher {
    /// Wait for the dialog message, failing if none appears in time.
    pub async fn message(self, timeout: Duration) -> Result<String, BrowserError> {
        tokio::time::timeout(timeout, self.rx)
            .await
            .map_err(|_| BrowserError::Timeout("No dialog appeared".into()))?
            .map_err(|_| BrowserError::ConnectionLost("Dialog watcher dropped".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_quotes_and_escapes() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(
            js_string("input[placeholder='First Name']"),
            "\"input[placeholder='First Name']\""
        );
        assert_eq!(js_string("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
