use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Browser-related errors
    Browser(BrowserError),
    /// Filesystem errors
    File(FileError),
    /// Per-item attempt errors (caught by the retry wrapper)
    Attempt(AttemptError),
    /// Configuration errors
    Config(ConfigError),
    /// Anything else (wrapping third-party errors)
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "browser error: {}", e),
            AppError::File(e) => write!(f, "file error: {}", e),
            AppError::Attempt(e) => write!(f, "attempt error: {}", e),
            AppError::Config(e) => write!(f, "config error: {}", e),
            AppError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Attempt(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// Browser-related errors
#[derive(Debug)]
pub enum BrowserError {
    /// Attaching to a running browser failed
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Launching a browser failed
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Opening a page failed
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Navigation failed
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Script execution failed
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Invalid browser configuration
    ConfigurationFailed { message: String },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "failed to attach to browser (port {}): {}", port, source)
            }
            BrowserError::LaunchFailed { source } => {
                write!(f, "failed to launch browser: {}", source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "failed to open a page: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "navigation to {} failed: {}", url, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "script execution failed: {}", source)
            }
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "browser configuration failed: {}", message)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::LaunchFailed { source }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::ConfigurationFailed { .. } => None,
        }
    }
}

/// Filesystem errors
#[derive(Debug)]
pub enum FileError {
    /// Reading a file failed
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Writing a file failed
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Renaming a downloaded file failed
    RenameFailed {
        from: String,
        to: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON (de)serialization failed
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Other I/O failure
    Io {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path, source)
            }
            FileError::RenameFailed { from, to, source } => {
                write!(f, "failed to rename {} to {}: {}", from, to, source)
            }
            FileError::JsonParseFailed { source } => {
                write!(f, "JSON parse failed: {}", source)
            }
            FileError::Io { source } => write!(f, "I/O failure: {}", source),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::RenameFailed { source, .. }
            | FileError::JsonParseFailed { source }
            | FileError::Io { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// Errors raised while processing a single work item.
///
/// These are the failures the per-item retry wrapper catches; none of them
/// aborts the run.
#[derive(Debug)]
pub enum AttemptError {
    /// The page title signals the portal's fatal-error screen
    FatalErrorPage { title: String },
    /// The export was triggered but no file ever appeared
    ExportNotStarted,
    /// A dialog appeared instead of a download
    PopupBlockedDownload,
    /// The item link is gone even after reloading the listing
    LinkNotFound { id: String },
    /// All attempts for this item were used up
    RetriesExhausted { attempts: u32, last_error: String },
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::FatalErrorPage { title } => {
                write!(f, "portal fatal-error page (title: {})", title)
            }
            AttemptError::ExportNotStarted => write!(f, "export did not start"),
            AttemptError::PopupBlockedDownload => {
                write!(f, "a dialog blocked the download")
            }
            AttemptError::LinkNotFound { id } => {
                write!(f, "item link not found in the listing (id: {})", id)
            }
            AttemptError::RetriesExhausted {
                attempts,
                last_error,
            } => {
                write!(
                    f,
                    "gave up after {} attempts (last error: {})",
                    attempts, last_error
                )
            }
        }
    }
}

impl std::error::Error for AttemptError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be parsed
    ParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Credentials missing from config file and environment
    MissingCredentials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseFailed { source } => {
                write!(f, "config parse failed: {}", source)
            }
            ConfigError::MissingCredentials => {
                write!(
                    f,
                    "portal credentials missing (set PORTAL_USERNAME / PORTAL_PASSWORD)"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ConfigError::MissingCredentials => None,
        }
    }
}

// ========== Conversions from common error types ==========
// Note: anyhow already converts anything implementing std::error::Error,
// so no manual From<AppError> for anyhow::Error is needed.

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::ParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::Io {
            source: Box::new(err),
        })
    }
}

// ========== Convenience constructors ==========

impl AppError {
    /// Browser attach failure
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// Navigation failure
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// File read failure
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// File write failure
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result type alias ==========

/// Application result type
pub type Result<T> = std::result::Result<T, AppError>;
