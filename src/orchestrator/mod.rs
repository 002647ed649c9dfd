//! Orchestration layer
//!
//! ## Responsibilities
//!
//! Owns the run: resources, sequencing and statistics. No business decisions
//! live here — those belong to the flow and capability layers.
//!
//! ## Layering
//!
//! ```text
//! orchestrator::batch_processor (the run: Vec<WorkItem>, strictly sequential)
//!     ↓
//! workflow::DownloadSession (one WorkItem: navigate → export → file → record)
//!     ↓
//! services (capabilities: portal / discovery / popup guard / sink / ledger)
//!     ↓
//! infrastructure (PageDriver: the one page owner)
//! ```

pub mod batch_processor;

pub use batch_processor::{App, RunStats};
