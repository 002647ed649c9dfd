//! # Payroll Fetcher
//!
//! Resilient batch-download orchestrator: drives an unreliable payroll web
//! portal to retrieve one report per (work-site, period) pair, files each
//! report under a deterministic name, and records every confirmed retrieval
//! in a durable history ledger so runs are resumable.
//!
//! ## Architecture
//!
//! Four strict layers, dependencies pointing down only:
//!
//! ### ① Infrastructure
//! - `infrastructure/` — holds the scarce resource (the browser page)
//! - [`PageDriver`] — the one page owner; eval / navigation / XPath capabilities
//!
//! ### ② Capabilities (services)
//! - `services/` — "what I can do", each for a single concern
//! - [`PortalNavigator`] — login, menu traversal, listing navigation
//! - `discovery` — parse the listing into work items
//! - [`PopupGuard`] — recognize and dismiss the portal's interruptions
//! - [`DownloadSink`] — watch the download directory, rename new files
//! - [`HistoryStore`] — durable key→timestamp ledger
//!
//! ### ③ Flow
//! - `workflow/` — the complete flow for one work item
//! - [`DownloadSession`] — navigate → export → file → record, bounded retries
//!
//! ### ④ Orchestration
//! - `orchestrator/` — the run: resources, sequencing, statistics
//! - [`App`] — browser setup, login, discovery, sequential item loop

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// Re-export the common types
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::PageDriver;
pub use models::WorkItem;
pub use orchestrator::{App, RunStats};
pub use services::{DownloadSink, HistoryStore, PopupGuard, PortalNavigator};
pub use workflow::{DownloadSession, ItemOutcome, SessionState};
