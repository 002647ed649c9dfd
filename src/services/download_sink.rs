//! Download sink - capability layer
//!
//! The portal gives no signal that an export finished; the only observable
//! effect is a new file in the download directory. The sink snapshots the
//! directory before an export and then polls for a new, fully-written file,
//! renaming it to its canonical name.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, FileError, Result};

/// Chrome appends this while a download is still in flight.
const PARTIAL_SUFFIX: &str = ".crdownload";

/// Download sink
pub struct DownloadSink {
    dir: PathBuf,
    poll: Duration,
}

impl DownloadSink {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: PathBuf::from(&config.download_dir),
            poll: config.poll_interval(),
        }
    }

    /// Sink over an explicit directory (tests, alternate layouts).
    pub fn with_dir(dir: impl Into<PathBuf>, poll: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll,
        }
    }

    /// The current set of report files in the sink directory.
    ///
    /// Taken immediately before triggering an export so new files can be told
    /// apart from pre-existing ones.
    pub async fn snapshot(&self) -> Result<HashSet<PathBuf>> {
        let mut files = HashSet::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // the directory may not exist yet on the very first run
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => {
                return Err(AppError::file_read_failed(
                    self.dir.display().to_string(),
                    e,
                ))
            }
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("xlsx") {
                files.insert(path);
            }
        }
        Ok(files)
    }

    /// Wait for a new, fully-written file and rename it to `canonical_name`.
    ///
    /// Polls until `deadline` elapses. Partial downloads and zero-byte files
    /// never qualify. On success any pre-existing file at the canonical
    /// destination is replaced (last write wins) and the result is `true`;
    /// deadline expiry yields `false`.
    pub async fn wait_and_rename(
        &self,
        pre_existing: &HashSet<PathBuf>,
        canonical_name: &str,
        deadline: Duration,
    ) -> Result<bool> {
        info!("⏳ waiting for a new file in {}...", self.dir.display());
        let started = Instant::now();

        while started.elapsed() < deadline {
            let current = self.snapshot().await?;
            if let Some(candidate) = self.pick_candidate(&current, pre_existing).await {
                // one more interval so the browser releases its lock
                sleep(self.poll).await;

                let destination = self.dir.join(canonical_name);
                if fs::metadata(&destination).await.is_ok() {
                    debug!("replacing existing {}", destination.display());
                    let _ = fs::remove_file(&destination).await;
                }
                fs::rename(&candidate, &destination).await.map_err(|e| {
                    AppError::File(FileError::RenameFailed {
                        from: candidate.display().to_string(),
                        to: destination.display().to_string(),
                        source: Box::new(e),
                    })
                })?;
                info!("✓ saved {}", destination.display());
                return Ok(true);
            }
            sleep(self.poll).await;
        }

        debug!(
            "no qualifying file appeared within {:?} in {}",
            deadline,
            self.dir.display()
        );
        Ok(false)
    }

    /// First new file that is neither a partial download nor empty.
    async fn pick_candidate(
        &self,
        current: &HashSet<PathBuf>,
        pre_existing: &HashSet<PathBuf>,
    ) -> Option<PathBuf> {
        for path in current.difference(pre_existing) {
            if is_partial(path) {
                continue;
            }
            match fs::metadata(path).await {
                Ok(meta) if meta.len() > 0 => return Some(path.clone()),
                _ => {}
            }
        }
        None
    }
}

fn is_partial(path: &Path) -> bool {
    path.to_string_lossy().ends_with(PARTIAL_SUFFIX)
}
