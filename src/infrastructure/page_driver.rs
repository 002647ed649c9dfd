//! Page driver - infrastructure layer
//!
//! Holds the single Page resource and exposes DOM capabilities only.
//! Everything goes through JS evaluation: the portal is an old server-rendered
//! app and XPath against the live DOM is the one addressing scheme that stays
//! stable across its re-renders.

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::{HandleJavaScriptDialogParams, ReloadParams};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppError, Result};

/// Page driver
///
/// Responsibilities:
/// - hold the unique Page resource
/// - expose eval / navigation / element capabilities
/// - no knowledge of WorkItem or the retrieval flow
pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    /// Wrap a page in a driver.
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// Run JS and return the JSON result.
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// Run JS and deserialize the result.
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    // ========== Navigation ==========

    /// Navigate to a URL.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    /// Reload the current page (plain F5).
    pub async fn reload(&self) -> Result<()> {
        self.page.execute(ReloadParams::default()).await?;
        Ok(())
    }

    /// Go back one history entry.
    pub async fn back(&self) -> Result<()> {
        self.eval("history.back(); true").await?;
        Ok(())
    }

    /// Current page title, empty if none.
    pub async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    /// Current URL, empty if none.
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    // ========== Elements (XPath) ==========

    /// True if at least one node matches the XPath.
    pub async fn exists(&self, xpath: &str) -> Result<bool> {
        let js = format!(
            "document.evaluate({xp}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength > 0",
            xp = js_string(xpath)
        );
        self.eval_as(js).await
    }

    /// Poll until the XPath matches or the timeout elapses.
    pub async fn wait_for(&self, xpath: &str, timeout: Duration, poll: Duration) -> Result<bool> {
        let started = Instant::now();
        loop {
            if self.exists(xpath).await? {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                debug!("wait_for timed out: {}", xpath);
                return Ok(false);
            }
            sleep(poll).await;
        }
    }

    /// JS-click the first node matching the XPath. Returns whether a node was found.
    pub async fn click_first(&self, xpath: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.evaluate({xp}, document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            xp = js_string(xpath)
        );
        self.eval_as(js).await
    }

    /// JS-click the first *visible, enabled* node matching the XPath.
    pub async fn click_first_visible(&self, xpath: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const snap = document.evaluate({xp}, document, null,
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                for (let i = 0; i < snap.snapshotLength; i++) {{
                    const el = snap.snapshotItem(i);
                    const visible = !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
                    if (visible && !el.disabled) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#,
            xp = js_string(xpath)
        );
        self.eval_as(js).await
    }

    /// Center-scroll the first matching node into view.
    pub async fn scroll_into_view(&self, xpath: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.evaluate({xp}, document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (!el) return false;
                el.scrollIntoView({{ block: 'center' }});
                return true;
            }})()"#,
            xp = js_string(xpath)
        );
        self.eval_as(js).await
    }

    /// Set the value of the first matching input, firing input/change events
    /// so the portal's own listeners notice.
    pub async fn fill(&self, xpath: &str, value: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.evaluate({xp}, document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (!el) return false;
                el.focus();
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            xp = js_string(xpath),
            val = js_string(value)
        );
        self.eval_as(js).await
    }

    /// Trimmed text of every node matching the XPath, in document order.
    pub async fn inner_texts(&self, xpath: &str) -> Result<Vec<String>> {
        let js = format!(
            r#"(() => {{
                const snap = document.evaluate({xp}, document, null,
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < snap.snapshotLength; i++) {{
                    const el = snap.snapshotItem(i);
                    out.push((el.innerText || el.textContent || '').trim());
                }}
                return out;
            }})()"#,
            xp = js_string(xpath)
        );
        self.eval_as(js).await
    }

    // ========== Native dialogs ==========

    /// Accept a browser-level JavaScript dialog if one is open.
    ///
    /// CDP errors when no dialog is showing; that is the "nothing there" signal.
    pub async fn accept_native_dialog(&self) -> bool {
        let params = match HandleJavaScriptDialogParams::builder().accept(true).build() {
            Ok(params) => params,
            Err(_) => return false,
        };
        self.page.execute(params).await.is_ok()
    }
}

/// Quote a Rust string as a JS string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_quotes_and_escapes() {
        assert_eq!(js_string("abc"), r#""abc""#);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_string("//a[contains(@href, '/x/1')]"), r#""//a[contains(@href, '/x/1')]""#);
    }
}
