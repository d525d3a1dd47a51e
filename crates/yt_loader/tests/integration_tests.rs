mod mocks;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::Ordering,
};

use chrono::{Local, NaiveDate};
use mocks::datastore::MockDataStore;
use yt_datastore::{BulkInsertResult, IsoDuration, RecordError, VideoRow};
use yt_loader::{RunSummary, SkipReason, YtLoader, YtLoaderBuilder};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// Writes `contents` to a scratch file and returns its path
fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("yt-loader-it-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn build_loader(store: MockDataStore, data_file: impl Into<PathBuf>) -> YtLoader<MockDataStore> {
    YtLoaderBuilder::default()
        .data_file(data_file)
        .store(store)
        .build()
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_loads_dated_file_into_store() {
    let store = MockDataStore::default();
    let rows = store.rows.clone();
    let schema_calls = store.schema_calls.clone();
    let closed = store.closed.clone();

    let loader = YtLoaderBuilder::new(fixtures_dir())
        .date(fixture_date())
        .store(store)
        .build();

    let summary = loader.run().await.expect("Run should succeed");

    assert_eq!(
        summary,
        RunSummary::Loaded(BulkInsertResult {
            attempted: 3,
            inserted: 3,
            skipped: 0,
        })
    );
    assert_eq!(schema_calls.load(Ordering::SeqCst), 1);
    assert!(closed.load(Ordering::SeqCst), "Store should be closed");

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows["abc12345678"],
        VideoRow {
            video_id: "abc12345678".into(),
            title: "Test".into(),
            upload_date: None,
            duration: Some(IsoDuration::from_seconds(90)),
            video_views: Some(100),
            likes_count: None,
            comments_count: None,
        }
    );

    let zoo = &rows["jNQXAC9IVRw"];
    assert_eq!(zoo.duration, Some(IsoDuration::from_seconds(19)));
    assert_eq!(zoo.comments_count, None);
    assert!(zoo.upload_date.is_some());
}

#[tokio::test]
async fn test_second_run_skips_existing_ids() {
    let store = MockDataStore::default();
    let rows = store.rows.clone();
    let second_store = store.reopen();
    let schema_calls = store.schema_calls.clone();

    let data_file = fixtures_dir().join("YT_data_2024-05-01.json");

    build_loader(store, &data_file)
        .run()
        .await
        .expect("First run should succeed");

    let summary = build_loader(second_store, &data_file)
        .run()
        .await
        .expect("Second run should succeed");

    assert_eq!(
        summary,
        RunSummary::Loaded(BulkInsertResult {
            attempted: 3,
            inserted: 0,
            skipped: 3,
        })
    );
    assert_eq!(rows.lock().unwrap().len(), 3);
    assert_eq!(schema_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_duplicate_id_keeps_first_row() {
    let path = scratch_file(
        "duplicates.json",
        r#"[
            {"video_id": "abc12345678", "title": "First"},
            {"video_id": "abc12345678", "title": "Second"}
        ]"#,
    );

    let store = MockDataStore::default();
    let rows = store.rows.clone();

    let summary = build_loader(store, path).run().await.unwrap();

    assert_eq!(
        summary,
        RunSummary::Loaded(BulkInsertResult {
            attempted: 2,
            inserted: 1,
            skipped: 1,
        })
    );
    assert_eq!(rows.lock().unwrap()["abc12345678"].title, "First");
}

// ─── Nothing to load ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_file_is_not_an_error() {
    let store = MockDataStore::default();
    let schema_calls = store.schema_calls.clone();
    let insert_calls = store.insert_calls.clone();
    let closed = store.closed.clone();

    let loader = YtLoaderBuilder::new(fixtures_dir())
        .date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap())
        .store(store)
        .build();

    let summary = loader.run().await.expect("Missing file should not fail");

    assert_eq!(summary, RunSummary::NothingToLoad(SkipReason::NotFound));
    assert_eq!(schema_calls.load(Ordering::SeqCst), 1);
    assert_eq!(insert_calls.load(Ordering::SeqCst), 0);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_empty_array_is_nothing_to_load() {
    let path = scratch_file("empty.json", "[]");
    let store = MockDataStore::default();
    let insert_calls = store.insert_calls.clone();

    let summary = build_loader(store, path).run().await.unwrap();

    assert_eq!(summary, RunSummary::NothingToLoad(SkipReason::Empty));
    assert_eq!(insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_file_is_nothing_to_load() {
    let path = scratch_file("malformed.json", "this is not json");
    let store = MockDataStore::default();
    let insert_calls = store.insert_calls.clone();

    let summary = build_loader(store, path).run().await.unwrap();

    assert_eq!(summary, RunSummary::NothingToLoad(SkipReason::ParseError));
    assert_eq!(insert_calls.load(Ordering::SeqCst), 0);
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_title_fails_whole_batch() {
    let path = scratch_file(
        "missing_title.json",
        r#"[
            {"video_id": "abc12345678", "title": "Fine"},
            {"video_id": "def12345678"}
        ]"#,
    );

    let store = MockDataStore::default();
    let rows = store.rows.clone();
    let insert_calls = store.insert_calls.clone();
    let closed = store.closed.clone();

    let err = build_loader(store, path)
        .run()
        .await
        .expect_err("Record without title should fail the run");

    let message = format!("{err:#}");
    assert!(message.contains("index 1"), "{message}");
    assert!(message.contains("title"), "{message}");
    assert!(matches!(
        err.downcast_ref::<RecordError>(),
        Some(RecordError::MissingField("title"))
    ));

    assert!(rows.lock().unwrap().is_empty(), "No rows should be stored");
    assert_eq!(insert_calls.load(Ordering::SeqCst), 0);
    assert!(closed.load(Ordering::SeqCst), "Store should be closed on failure");
}

#[tokio::test]
async fn test_missing_video_id_fails_whole_batch() {
    let path = scratch_file("missing_id.json", r#"[{"title": "No id"}]"#);
    let store = MockDataStore::default();
    let rows = store.rows.clone();

    let err = build_loader(store, path).run().await.unwrap_err();

    assert!(format!("{err:#}").contains("video_id"));
    assert!(rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_failure_is_propagated_and_store_closed() {
    let store = MockDataStore::failing_insert("connection reset by peer");
    let rows = store.rows.clone();
    let closed = store.closed.clone();

    let err = build_loader(store, fixtures_dir().join("YT_data_2024-05-01.json"))
        .run()
        .await
        .expect_err("Insert failure should fail the run");

    assert!(format!("{err:#}").contains("connection reset by peer"));
    assert!(rows.lock().unwrap().is_empty());
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_schema_failure_stops_before_insert() {
    let store = MockDataStore::failing_schema("permission denied for database");
    let insert_calls = store.insert_calls.clone();
    let closed = store.closed.clone();

    let err = build_loader(store, fixtures_dir().join("YT_data_2024-05-01.json"))
        .run()
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("permission denied"));
    assert_eq!(insert_calls.load(Ordering::SeqCst), 0);
    assert!(closed.load(Ordering::SeqCst));
}

// ─── Builder ─────────────────────────────────────────────────────────────────

#[test]
fn test_builder_defaults_to_todays_file() {
    let loader = YtLoaderBuilder::new("./data")
        .store(MockDataStore::default())
        .build();

    let expected = format!("./data/YT_data_{}.json", Local::now().date_naive());
    assert_eq!(loader.data_file(), Path::new(&expected));
}

#[test]
fn test_builder_explicit_file_wins_over_date() {
    let loader = YtLoaderBuilder::new("./data")
        .date(fixture_date())
        .data_file("/tmp/custom.json")
        .store(MockDataStore::default())
        .build();

    assert_eq!(loader.data_file(), Path::new("/tmp/custom.json"));
}
