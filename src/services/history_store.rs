//! History ledger - capability layer
//!
//! Durable key→timestamp record of confirmed retrievals. A key being present
//! means the file was materialized at least once; the orchestrator never
//! deletes entries.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, Result};

/// History ledger
///
/// Whole-map rewrite on every save; the data set is a handful of entries and
/// this runs on a single control task, so no finer-grained persistence is
/// warranted.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a ledger handle at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the ledger; an absent file is an empty ledger, not an error.
    pub async fn load(&self) -> Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let entries: HashMap<String, String> = serde_json::from_str(&content)?;
                debug!(
                    "loaded {} history entries from {}",
                    entries.len(),
                    self.path.display()
                );
                Ok(entries)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no history at {}, starting empty", self.path.display());
                Ok(HashMap::new())
            }
            Err(e) => Err(AppError::file_read_failed(
                self.path.display().to_string(),
                e,
            )),
        }
    }

    /// Insert one confirmed entry and persist the ledger.
    ///
    /// Keeps the in-memory map and the file in step: when the write fails
    /// the entry is rolled back, so a later save for another item cannot
    /// carry an unconfirmed key into the ledger.
    pub async fn record(
        &self,
        entries: &mut HashMap<String, String>,
        key: String,
        stamp: String,
    ) -> Result<()> {
        entries.insert(key.clone(), stamp);
        if let Err(e) = self.save(entries).await {
            entries.remove(&key);
            return Err(e);
        }
        Ok(())
    }

    /// Persist the full ledger, overwriting prior content.
    pub async fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;
        debug!(
            "saved {} history entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}
