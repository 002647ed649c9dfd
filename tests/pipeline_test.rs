//! Offline tests for the filesystem half of the pipeline: the history ledger
//! and the download sink. No browser required.

use std::collections::HashMap;
use std::time::Duration;

use payroll_fetcher::{DownloadSink, HistoryStore, WorkItem};

#[tokio::test]
async fn history_loads_empty_when_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history.json"));

    let entries = store.load().await.expect("absent ledger should load soft");
    assert!(entries.is_empty());
}

#[tokio::test]
async fn history_round_trips_and_overwrites_whole_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history.json"));

    let mut entries = HashMap::new();
    entries.insert("10_2026/01".to_string(), "2026-02-01 09:30:00".to_string());
    store.save(&entries).await.expect("first save");

    entries.insert("12_2025/12".to_string(), "2026-02-01 09:31:00".to_string());
    store.save(&entries).await.expect("second save");

    let loaded = store.load().await.expect("load");
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get("10_2026/01").map(String::as_str),
        Some("2026-02-01 09:30:00")
    );
}

#[tokio::test]
async fn record_persists_the_entry_and_the_map_together() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("history.json"));

    let mut entries = HashMap::new();
    store
        .record(
            &mut entries,
            "10_2026/01".to_string(),
            "2026-02-01 09:30:00".to_string(),
        )
        .await
        .expect("record");

    assert!(entries.contains_key("10_2026/01"));
    let reloaded = store.load().await.expect("reload");
    assert_eq!(reloaded, entries);
}

#[tokio::test]
async fn failed_ledger_write_rolls_back_the_in_memory_entry() {
    // pointing the ledger at an existing directory makes every write fail
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path());

    let mut entries = HashMap::new();
    let result = store
        .record(
            &mut entries,
            "10_2026/01".to_string(),
            "2026-02-01 09:30:00".to_string(),
        )
        .await;

    assert!(result.is_err(), "writing over a directory must fail");
    // the unconfirmed key must not linger and ride along with a later save
    assert!(entries.is_empty());
}

#[tokio::test]
async fn sink_renames_the_new_file_not_the_pre_existing_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("A.xlsx"), b"already here").expect("seed A");

    let sink = DownloadSink::with_dir(dir.path(), Duration::from_millis(50));
    let pre = sink.snapshot().await.expect("snapshot");
    assert_eq!(pre.len(), 1);

    let late_file = dir.path().join("B.xlsx");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(late_file, b"fresh report").expect("write B");
    });

    let renamed = sink
        .wait_and_rename(&pre, "Report - Alpha - 2026-01.xlsx", Duration::from_secs(5))
        .await
        .expect("wait");
    assert!(renamed);

    let canonical = dir.path().join("Report - Alpha - 2026-01.xlsx");
    assert_eq!(std::fs::read(&canonical).expect("canonical"), b"fresh report");
    // the pre-existing file is untouched, the raw download is gone
    assert!(dir.path().join("A.xlsx").exists());
    assert!(!dir.path().join("B.xlsx").exists());
}

#[tokio::test]
async fn sink_times_out_when_nothing_new_appears() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("A.xlsx"), b"already here").expect("seed A");

    let sink = DownloadSink::with_dir(dir.path(), Duration::from_millis(50));
    let pre = sink.snapshot().await.expect("snapshot");

    let renamed = sink
        .wait_and_rename(&pre, "Report - Alpha - 2026-01.xlsx", Duration::from_millis(300))
        .await
        .expect("wait");
    assert!(!renamed);
    assert!(!dir.path().join("Report - Alpha - 2026-01.xlsx").exists());
}

#[tokio::test]
async fn sink_ignores_zero_byte_files() {
    let dir = tempfile::tempdir().expect("tempdir");

    let sink = DownloadSink::with_dir(dir.path(), Duration::from_millis(50));
    let pre = sink.snapshot().await.expect("snapshot");

    std::fs::write(dir.path().join("B.xlsx"), b"").expect("write empty B");

    let renamed = sink
        .wait_and_rename(&pre, "Report - Alpha - 2026-01.xlsx", Duration::from_millis(300))
        .await
        .expect("wait");
    assert!(!renamed, "an empty file must not qualify");
}

#[tokio::test]
async fn sink_replaces_an_existing_canonical_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let canonical = dir.path().join("Report - Alpha - 2026-01.xlsx");
    std::fs::write(&canonical, b"stale").expect("seed canonical");

    let sink = DownloadSink::with_dir(dir.path(), Duration::from_millis(50));
    let pre = sink.snapshot().await.expect("snapshot");

    std::fs::write(dir.path().join("B.xlsx"), b"replacement").expect("write B");

    let renamed = sink
        .wait_and_rename(&pre, "Report - Alpha - 2026-01.xlsx", Duration::from_secs(5))
        .await
        .expect("wait");
    assert!(renamed);

    // replaced, not duplicated
    assert_eq!(std::fs::read(&canonical).expect("canonical"), b"replacement");
    let xlsx_count = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("xlsx"))
        .count();
    assert_eq!(xlsx_count, 1);
}

#[tokio::test]
async fn succeeded_item_leaves_file_and_ledger_entry_in_step() {
    // the success invariant, minus the browser: canonical file present and
    // the ledger keyed by the item's composite key
    let dir = tempfile::tempdir().expect("tempdir");
    let item = WorkItem::parse("10 Alpha 2026/01").expect("item");

    let sink = DownloadSink::with_dir(dir.path(), Duration::from_millis(50));
    let pre = sink.snapshot().await.expect("snapshot");
    std::fs::write(dir.path().join("export.xlsx"), b"rows").expect("write export");

    let renamed = sink
        .wait_and_rename(&pre, &item.canonical_file_name(), Duration::from_secs(5))
        .await
        .expect("wait");
    assert!(renamed);
    assert!(dir.path().join("Report - Alpha - 2026-01.xlsx").exists());

    let store = HistoryStore::new(dir.path().join("history.json"));
    let mut entries = store.load().await.expect("load");
    entries.insert(
        item.history_key(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    store.save(&entries).await.expect("save");

    let reloaded = store.load().await.expect("reload");
    assert!(reloaded.contains_key("10_2026/01"));
}
