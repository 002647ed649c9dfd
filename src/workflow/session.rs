//! Retrieval session - flow layer
//!
//! Drives one work item from the listing to a filed report:
//! navigate → (maybe) export → wait for the file → record history, with a
//! bounded number of attempts and interruption sweeps at every checkpoint.

use std::cell::Cell;
use std::collections::HashMap;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AttemptError, Result};
use crate::infrastructure::PageDriver;
use crate::models::WorkItem;
use crate::services::{DownloadSink, HistoryStore, PopupGuard, PortalNavigator};
use crate::utils::retry;

/// Where a session currently is. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Navigating,
    AwaitingExport,
    AwaitingFile,
    Succeeded,
    Failed,
}

/// How a successful session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A report file was materialized and filed under its canonical name
    Downloaded,
    /// The portal has nothing to export for this item; success without a file
    NoData,
}

/// Retrieval session
///
/// Ephemeral per-item state machine. Holds no resources of its own — the
/// driver, guard, sink, ledger and navigator are borrowed from the
/// orchestrator and threaded through explicitly.
pub struct DownloadSession<'a> {
    driver: &'a PageDriver,
    guard: &'a PopupGuard,
    sink: &'a DownloadSink,
    history: &'a HistoryStore,
    portal: &'a PortalNavigator,
    config: &'a Config,
    state: Cell<SessionState>,
}

impl<'a> DownloadSession<'a> {
    pub fn new(
        driver: &'a PageDriver,
        guard: &'a PopupGuard,
        sink: &'a DownloadSink,
        history: &'a HistoryStore,
        portal: &'a PortalNavigator,
        config: &'a Config,
    ) -> Self {
        Self {
            driver,
            guard,
            sink,
            history,
            portal,
            config,
            state: Cell::new(SessionState::NotStarted),
        }
    }

    /// Current state (terminal once the run returns).
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Process one work item to a terminal state.
    ///
    /// On success (file downloaded or no data) the history ledger is updated
    /// and persisted before returning, and the browser is sent back to the
    /// listing. On exhausted retries nothing is written and the error is
    /// returned; the caller logs it and moves on to the next item.
    pub async fn run(
        &self,
        item: &WorkItem,
        history: &mut HashMap<String, String>,
    ) -> Result<ItemOutcome> {
        let outcome = retry::with_recovery(
            self.config.max_attempts,
            |attempt| self.attempt(item, attempt),
            |attempt| self.recover_context(attempt),
        )
        .await;

        match outcome {
            Ok(outcome) => {
                let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                if let Err(e) = self
                    .history
                    .record(history, item.history_key(), stamp)
                    .await
                {
                    self.enter(SessionState::Failed);
                    return Err(e);
                }

                // Durably recorded: the item is a success from here on.
                // Navigation trouble must not demote it; the next session's
                // stale-link recovery restores the listing by itself.
                self.enter(SessionState::Succeeded);
                if let Err(e) = self.driver.back().await {
                    warn!("navigate back after success failed: {}", e);
                }
                sleep(self.config.short_pause()).await;

                Ok(outcome)
            }
            Err(e) => {
                self.enter(SessionState::Failed);
                Err(e)
            }
        }
    }

    /// One full attempt: navigate, export, wait for the file.
    async fn attempt(&self, item: &WorkItem, attempt: u32) -> Result<ItemOutcome> {
        info!(
            "▶ {} — attempt {}/{}",
            item, attempt, self.config.max_attempts
        );
        self.enter(SessionState::Navigating);

        // an interruption may be left over from the previous item
        self.guard.dismiss_if_present(self.driver).await?;

        // taken before anything can trigger a download
        let pre_snapshot = self.sink.snapshot().await?;

        let link_xpath = self.portal.detail_link_xpath(&item.id);
        if !self
            .driver
            .wait_for(
                &link_xpath,
                self.config.element_wait(),
                self.config.poll_interval(),
            )
            .await?
        {
            // the listing went stale underneath us
            info!("link for item {} vanished, reloading the listing", item.id);
            self.portal.goto_listing(self.driver).await?;
            if !self.driver.exists(&link_xpath).await? {
                return Err(AppError::Attempt(AttemptError::LinkNotFound {
                    id: item.id.clone(),
                }));
            }
        }

        self.driver.scroll_into_view(&link_xpath).await?;
        sleep(self.config.short_pause()).await;
        if !self.driver.click_first(&link_xpath).await? {
            return Err(AppError::Attempt(AttemptError::LinkNotFound {
                id: item.id.clone(),
            }));
        }
        sleep(self.config.nav_settle()).await;

        self.enter(SessionState::AwaitingExport);

        // The portal intermittently throws a blocking dialog right on page
        // entry, and one dismissal does not always clear it: reload and sweep
        // again.
        if self.guard.dismiss_if_present(self.driver).await? {
            warn!("dialog on page entry, reloading the detail view");
            self.driver.reload().await?;
            sleep(self.config.reload_settle()).await;
            self.guard.dismiss_if_present(self.driver).await?;
        }

        let title = self.driver.title().await?;
        if title.contains(&self.config.fatal_title_marker) {
            return Err(AppError::Attempt(AttemptError::FatalErrorPage { title }));
        }

        let export_xpath = format!("//*[@id='{}']", self.config.export_button_id);
        if !self
            .driver
            .wait_for(
                &export_xpath,
                self.config.export_wait(),
                self.config.poll_interval(),
            )
            .await?
        {
            // absence of the export trigger means the item has no data,
            // which is a success, not a failure
            info!("{}: nothing to export, treating as complete", item);
            return Ok(ItemOutcome::NoData);
        }

        // final sweep right before the click that matters
        self.guard.dismiss_if_present(self.driver).await?;
        if !self.driver.click_first(&export_xpath).await? {
            return Err(AppError::Attempt(AttemptError::ExportNotStarted));
        }

        self.enter(SessionState::AwaitingFile);
        let downloaded = self
            .sink
            .wait_and_rename(
                &pre_snapshot,
                &item.canonical_file_name(),
                self.config.file_wait(),
            )
            .await?;

        if downloaded {
            return Ok(ItemOutcome::Downloaded);
        }

        // No file. If a dialog appeared when we clicked export, that explains
        // the silence; reload and let the retry wrapper take it from here.
        if self.guard.dismiss_if_present(self.driver).await? {
            warn!("a dialog appeared instead of a download, reloading");
            self.driver.reload().await?;
            sleep(self.config.reload_settle()).await;
            return Err(AppError::Attempt(AttemptError::PopupBlockedDownload));
        }
        Err(AppError::Attempt(AttemptError::ExportNotStarted))
    }

    /// Put the browser back in a usable place between attempts.
    ///
    /// If the failure navigated us off the listing entirely, go there; if we
    /// are still on it (or on a broken detail view), a refresh is enough.
    async fn recover_context(&self, attempt: u32) {
        debug!("recovering context after attempt {}", attempt);

        let url = self.driver.current_url().await.unwrap_or_default();
        if url.contains(&self.config.listing_path) {
            if let Err(e) = self.driver.reload().await {
                warn!("refresh during recovery failed: {}", e);
            }
            sleep(self.config.retry_pause()).await;
        } else if let Err(e) = self.portal.goto_listing(self.driver).await {
            // goto_listing pauses for the reload to settle on its own
            warn!("listing navigation during recovery failed: {}", e);
        }
    }

    fn enter(&self, next: SessionState) {
        debug!("session state: {:?} -> {:?}", self.state.get(), next);
        self.state.set(next);
    }
}
