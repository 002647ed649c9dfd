//! Batch processor - orchestration layer
//!
//! ## Responsibilities
//!
//! The entry point of the whole application:
//!
//! 1. **Initialization**: browser session (attach or headless launch),
//!    download-directory wiring, page driver
//! 2. **Run setup**: login, menu navigation, item discovery, ledger load
//! 3. **Sequential processing**: one [`DownloadSession`] per work item —
//!    strictly in order, the portal and the filesystem polling are both
//!    stateful
//! 4. **Resilience policy**: a failed item is logged and skipped, never
//!    aborting the run; already-recorded items are skipped unless
//!    `force_reattempt` is set
//! 5. **Statistics**: startup banner and final per-outcome counts

use std::path::Path;

use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::PageDriver;
use crate::services::{discovery, DownloadSink, HistoryStore, PopupGuard, PortalNavigator};
use crate::workflow::{DownloadSession, ItemOutcome};

/// Application main structure
pub struct App {
    config: Config,
    _browser: Browser,
    driver: PageDriver,
}

/// Per-run outcome counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub downloaded: usize,
    pub no_data: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl App {
    /// Set up the browser session and the output directory.
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        tokio::fs::create_dir_all(&config.download_dir).await?;

        let (browser, page) = match config.attach_port {
            Some(port) => browser::connect_to_browser_and_page(port, None).await?,
            None => {
                browser::launch_headless_browser(
                    config.chrome_executable.as_deref().map(Path::new),
                )
                .await?
            }
        };
        browser::allow_downloads_to(&browser, Path::new(&config.download_dir)).await?;

        let driver = PageDriver::new(page);

        Ok(Self {
            config,
            _browser: browser,
            driver,
        })
    }

    /// Run the whole retrieval batch.
    ///
    /// Login or discovery failure aborts the run (history persisted so far
    /// stays valid); a single item's failure never does.
    pub async fn run(&self) -> Result<RunStats> {
        let portal = PortalNavigator::new(&self.config);
        portal.login(&self.driver).await?;
        portal.open_listing(&self.driver).await?;

        let items = discovery::discover(&self.driver, &self.config.min_period).await?;
        if items.is_empty() {
            warn!("⚠ no retrievable items in the listing, nothing to do");
            return Ok(RunStats::default());
        }

        let history_store = HistoryStore::new(&self.config.history_file);
        let mut history = history_store.load().await?;

        let guard = PopupGuard::new(&self.config);
        let sink = DownloadSink::new(&self.config);

        let mut stats = RunStats {
            total: items.len(),
            ..Default::default()
        };

        for item in &items {
            if !self.config.force_reattempt && history.contains_key(&item.history_key()) {
                info!("↷ {} already recorded, skipping", item);
                stats.skipped += 1;
                continue;
            }

            let session = DownloadSession::new(
                &self.driver,
                &guard,
                &sink,
                &history_store,
                &portal,
                &self.config,
            );
            match session.run(item, &mut history).await {
                Ok(ItemOutcome::Downloaded) => {
                    info!("✅ {} downloaded", item);
                    stats.downloaded += 1;
                }
                Ok(ItemOutcome::NoData) => {
                    info!("✅ {} had no data to export", item);
                    stats.no_data += 1;
                }
                Err(e) => {
                    error!("❌ {} abandoned: {}", item, e);
                    stats.failed += 1;
                }
            }
        }

        print_final_stats(&stats);
        Ok(stats)
    }
}

// ========== Log helpers ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 payroll report retrieval run");
    info!("📁 output directory: {}", config.download_dir);
    info!(
        "📅 period cutoff: {} | attempts per item: {}",
        config.min_period, config.max_attempts
    );
    if config.force_reattempt {
        info!("♻ force_reattempt set: recorded items will be re-processed");
    }
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &RunStats) {
    info!("{}", "=".repeat(60));
    info!("📊 run complete");
    info!(
        "finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "✅ downloaded: {} | no data: {} | ↷ skipped: {}",
        stats.downloaded, stats.no_data, stats.skipped
    );
    info!("❌ failed: {} / {}", stats.failed, stats.total);
    info!("{}", "=".repeat(60));
}
