use std::time::Duration;

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{AppError, BrowserError, Result};

/// Attach to an already-running browser on its debug port.
///
/// Reuses the first open tab if there is one (the operator may already be
/// logged in there), otherwise opens a fresh one. Navigates to `target_url`
/// when given.
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("attaching to browser at {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url)
        .await
        .map_err(|e| AppError::browser_connection_failed(port, e))?;

    // Drain CDP events in the background for the lifetime of the connection.
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // Short pause to let the browser state sync.
    sleep(Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("{} open pages", pages.len());

    let page = match pages.into_iter().next() {
        Some(page) => page,
        None => browser.new_page("about:blank").await.map_err(|e| {
            AppError::Browser(BrowserError::PageCreationFailed {
                source: Box::new(e),
            })
        })?,
    };

    if let Some(url) = target_url {
        page.goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        info!("navigated to {}", url);
    }

    Ok((browser, page))
}
