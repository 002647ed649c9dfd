pub mod connection;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_headless_browser;

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::Browser;
use tracing::debug;

use crate::error::{AppError, BrowserError, Result};

/// Point the browser's downloads at `dir` (CDP wants an absolute path).
pub async fn allow_downloads_to(browser: &Browser, dir: &Path) -> Result<()> {
    let absolute = std::fs::canonicalize(dir)?;
    debug!("downloads will land in {}", absolute.display());

    let params = SetDownloadBehaviorParams::builder()
        .behavior(SetDownloadBehaviorBehavior::Allow)
        .download_path(absolute.to_string_lossy().to_string())
        .build()
        .map_err(|message| AppError::Browser(BrowserError::ConfigurationFailed { message }))?;
    browser.execute(params).await?;
    Ok(())
}
