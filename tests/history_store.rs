//! Disk-backed history behavior, exercised the way the TUI uses it.

use tempfile::TempDir;
use trip_search::history::{HISTORY_CAP, HISTORY_FILE, HistoryStore, JsonHistoryStore};
use trip_search::model::types::SuggestItem;

fn item(label: &str) -> SuggestItem {
    SuggestItem::new(format!("loc:{}", label.to_lowercase()), label)
}

#[test]
fn selections_survive_a_restart_most_recent_first() {
    let dir = TempDir::new().unwrap();

    {
        let mut store = JsonHistoryStore::open_default(dir.path());
        store.record(item("Tehran"));
        store.record(item("Berlin"));
        store.record(item("Kish Island"));
    }

    let store = JsonHistoryStore::open_default(dir.path());
    let labels: Vec<_> = store.load().into_iter().map(|e| e.label).collect();
    assert_eq!(labels, ["Kish Island", "Berlin", "Tehran"]);
}

#[test]
fn persisted_layout_is_a_plain_json_array() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonHistoryStore::open_default(dir.path());
    store.record(item("Berlin").with_count(7));

    let body = std::fs::read_to_string(dir.path().join(HISTORY_FILE)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    let entries = parsed.as_array().expect("top-level array");
    assert_eq!(entries[0]["id"], "loc:berlin");
    assert_eq!(entries[0]["label"], "Berlin");
    assert_eq!(entries[0]["count"], 7);
}

#[test]
fn cap_holds_across_restarts() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = JsonHistoryStore::open_default(dir.path());
        for i in 0..12 {
            store.record(item(&format!("City {i}")));
        }
    }
    let store = JsonHistoryStore::open_default(dir.path());
    assert_eq!(store.load().len(), HISTORY_CAP);
    assert_eq!(store.load()[0].label, "City 11");
}

#[test]
fn missing_dir_and_garbage_content_read_as_empty() {
    let dir = TempDir::new().unwrap();

    let absent = JsonHistoryStore::open(dir.path().join("no/such/dir/history.json"));
    assert!(absent.load().is_empty());

    let garbage_path = dir.path().join(HISTORY_FILE);
    std::fs::write(&garbage_path, "[{\"id\": 42}]").unwrap();
    let garbage = JsonHistoryStore::open(&garbage_path);
    assert!(garbage.load().is_empty(), "wrong shapes degrade to empty");
}

#[test]
fn recording_into_a_missing_dir_creates_it() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("deep/history.json");
    let mut store = JsonHistoryStore::open(&nested);
    store.record(item("Shiraz"));
    assert!(nested.exists());
}
