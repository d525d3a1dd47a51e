use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use yt_datastore::{BulkInsertResult, DataStore, VideoRow};

/// In-memory stand-in for the videos table, keyed by `video_id`
#[derive(Clone, Default)]
pub struct MockDataStore {
    pub rows: Arc<Mutex<BTreeMap<String, VideoRow>>>,
    pub schema_calls: Arc<AtomicUsize>,
    pub insert_calls: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
    pub fail_schema_with: Option<String>,
    pub fail_insert_with: Option<String>,
}

impl MockDataStore {
    pub fn failing_insert(msg: &str) -> Self {
        Self {
            fail_insert_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_schema(msg: &str) -> Self {
        Self {
            fail_schema_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    /// Another handle on the same table, standing in for a second run
    pub fn reopen(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            schema_calls: self.schema_calls.clone(),
            insert_calls: self.insert_calls.clone(),
            closed: Arc::new(AtomicBool::new(false)),
            fail_schema_with: None,
            fail_insert_with: None,
        }
    }
}

impl DataStore for MockDataStore {
    async fn ensure_schema(&mut self) -> anyhow::Result<()> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref msg) = self.fail_schema_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(())
    }

    async fn bulk_insert_videos(&mut self, rows: &[VideoRow]) -> anyhow::Result<BulkInsertResult> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref msg) = self.fail_insert_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        let mut table = self.rows.lock().unwrap();
        let mut inserted = 0;
        for row in rows {
            if !table.contains_key(&row.video_id) {
                table.insert(row.video_id.clone(), row.clone());
                inserted += 1;
            }
        }

        Ok(BulkInsertResult::new(rows.len(), inserted))
    }

    async fn close(self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
