use std::path::Path;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{AppError, BrowserError, Result};

/// Launch a headless browser and open a blank page.
pub async fn launch_headless_browser(
    chrome_executable: Option<&Path>,
) -> Result<(Browser, Page)> {
    info!("🚀 launching headless browser...");

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--remote-debugging-port=0",
    ]);
    if let Some(path) = chrome_executable {
        debug!("using browser executable {}", path.display());
        builder = builder.chrome_executable(path);
    }
    let config = builder
        .build()
        .map_err(|message| AppError::Browser(BrowserError::ConfigurationFailed { message }))?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("headless browser up");

    // Drain CDP events in the background for the lifetime of the browser.
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // Short pause to let the browser state sync.
    sleep(Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;

    Ok((browser, page))
}
