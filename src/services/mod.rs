pub mod discovery;
pub mod download_sink;
pub mod history_store;
pub mod popup_guard;
pub mod portal;

pub use download_sink::DownloadSink;
pub use history_store::HistoryStore;
pub use popup_guard::PopupGuard;
pub use portal::PortalNavigator;
