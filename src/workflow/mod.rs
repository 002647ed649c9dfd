//! Flow layer
//!
//! Defines the complete processing flow for one work item.

pub mod session;

pub use session::{DownloadSession, ItemOutcome, SessionState};
