use chrono::{Duration, TimeZone, Utc};
use stormwatch_core::{Location, StoreStatus};

use super::*;

fn location(code: &str, status: StoreStatus) -> Location {
    Location {
        store_code: code.to_string(),
        business_name: "Waffle House".to_string(),
        address: "1 Main St".to_string(),
        city: "Mobile".to_string(),
        state: "AL".to_string(),
        postal_code: "36602".to_string(),
        latitude: 30.69,
        longitude: -88.04,
        status,
        last_changed: None,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn new_store_is_recorded_with_now() {
    let mut history = StatusHistory::new();
    let modified = history.reconcile(&[location("1", StoreStatus::Active)], t0());

    assert!(modified);
    assert_eq!(history.last_changed("1"), Some(t0()));
    assert_eq!(history.get("1").unwrap().status, StoreStatus::Active);
}

#[test]
fn closing_a_store_updates_last_changed() {
    let mut history = StatusHistory::new();
    history.reconcile(&[location("1", StoreStatus::Active)], t0());

    let later = t0() + Duration::hours(3);
    assert!(history.reconcile(&[location("1", StoreStatus::Closed)], later));
    assert_eq!(history.last_changed("1"), Some(later));
    assert_eq!(history.get("1").unwrap().status, StoreStatus::Closed);
}

#[test]
fn closed_to_temporarily_closed_is_not_a_change() {
    let mut history = StatusHistory::new();
    history.reconcile(&[location("1", StoreStatus::Closed)], t0());

    let later = t0() + Duration::hours(5);
    assert!(!history.reconcile(&[location("1", StoreStatus::ClosedTemporary)], later));
    assert_eq!(history.last_changed("1"), Some(t0()));
    assert_eq!(history.get("1").unwrap().status, StoreStatus::Closed);
}

#[test]
fn unchanged_feed_reports_no_modification() {
    let mut history = StatusHistory::new();
    let feed = [
        location("1", StoreStatus::Active),
        location("2", StoreStatus::Closed),
    ];
    history.reconcile(&feed, t0());
    assert!(!history.reconcile(&feed, t0() + Duration::hours(1)));
}

#[test]
fn annotate_fills_known_and_clears_unknown_stores() {
    let mut history = StatusHistory::new();
    history.reconcile(&[location("1", StoreStatus::Closed)], t0());

    let mut locations = vec![
        location("1", StoreStatus::Closed),
        location("9", StoreStatus::Active),
    ];
    locations[1].last_changed = Some(t0());
    history.annotate(&mut locations);

    assert_eq!(locations[0].last_changed, Some(t0()));
    assert_eq!(locations[1].last_changed, None);
}

#[test]
fn deserializes_existing_history_file_format() {
    let json = r#"{
        "1402": { "status": "CT", "last_changed": "2025-06-01T12:00:00Z", "closed_due_to_storm": false },
        "77": { "status": "A", "last_changed": "2025-05-30T08:15:00Z" }
    }"#;

    let history: StatusHistory = serde_json::from_str(json).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.get("1402").unwrap().status, StoreStatus::ClosedTemporary);
    assert_eq!(history.last_changed_map().get("1402"), Some(&t0()));
}

#[tokio::test]
async fn store_load_of_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = StatusHistoryStore::new(dir.path().join("absent.json"));
    let history = store.load().await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn store_reconcile_creates_file_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("sensor-status.json");
    let store = StatusHistoryStore::new(&path);

    let history = store
        .reconcile(&[location("1", StoreStatus::Closed)], t0())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert!(path.exists(), "parent directory and file should be created");

    let reloaded = store.load().await.unwrap();
    assert_eq!(reloaded, history);
}

#[tokio::test]
async fn store_reconcile_without_changes_does_not_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor-status.json");
    let store = StatusHistoryStore::new(&path);
    let feed = [location("1", StoreStatus::Active)];

    let history = store.reconcile(&feed, t0()).await.unwrap();

    // Compact JSON would come back pretty-printed if the file were rewritten.
    let compact = serde_json::to_string(&history).unwrap();
    std::fs::write(&path, &compact).unwrap();

    store
        .reconcile(&feed, t0() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), compact);
}

#[tokio::test]
async fn store_load_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor-status.json");
    std::fs::write(&path, "not json").unwrap();

    let result = StatusHistoryStore::new(&path).load().await;
    assert!(matches!(result, Err(HistoryError::Parse { .. })));
}

#[tokio::test]
async fn store_reconcile_recovers_from_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor-status.json");
    std::fs::write(&path, r#"{"1": {"status": "C", "last_chan"#).unwrap();
    let store = StatusHistoryStore::new(&path);

    let history = store
        .reconcile(&[location("1", StoreStatus::Closed)], t0())
        .await
        .unwrap();
    assert_eq!(history.last_changed("1"), Some(t0()));

    let quarantined = dir.path().join("sensor-status.json.corrupt");
    assert!(quarantined.exists(), "corrupt file should be kept aside");
    assert_eq!(store.load().await.unwrap(), history);

    // The next run keeps working from the rebuilt file.
    let later = t0() + Duration::hours(1);
    let history = store
        .reconcile(&[location("1", StoreStatus::Active)], later)
        .await
        .unwrap();
    assert_eq!(history.last_changed("1"), Some(later));
}

#[tokio::test]
async fn concurrent_reconciles_keep_every_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor-status.json");
    let store = StatusHistoryStore::new(&path);
    let other = store.clone();

    let first = [location("1", StoreStatus::Closed)];
    let second = [location("2", StoreStatus::ClosedTemporary)];
    let (a, b) = tokio::join!(
        store.reconcile(&first, t0()),
        other.reconcile(&second, t0()),
    );
    a.unwrap();
    b.unwrap();

    let saved = store.load().await.unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.get("1").is_some());
    assert!(saved.get("2").is_some());
}

#[tokio::test]
async fn save_replaces_file_without_leaving_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor-status.json");
    let store = StatusHistoryStore::new(&path);

    let mut history = StatusHistory::new();
    history.reconcile(&[location("1", StoreStatus::Active)], t0());
    store.save(&history).await.unwrap();
    history.reconcile(&[location("2", StoreStatus::Closed)], t0());
    store.save(&history).await.unwrap();

    assert_eq!(store.load().await.unwrap(), history);
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("sensor-status.json")]);
}
