use std::future::Future;

use crate::VideoRow;

pub mod postgres;

/// Storage for the raw video table. Implementations own a single
/// connection for the lifetime of a run.
pub trait DataStore {
    /// Creates the `youtube` schema and the videos table when missing.
    /// Safe to call on every run.
    fn ensure_schema(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Inserts `rows` in one transaction. Rows whose `video_id` already
    /// exists are skipped without touching the stored row; any other
    /// failure rolls back the whole batch.
    fn bulk_insert_videos(
        &mut self,
        rows: &[VideoRow],
    ) -> impl Future<Output = anyhow::Result<BulkInsertResult>> + Send;

    /// Releases the underlying connection
    fn close(self) -> impl Future<Output = anyhow::Result<()>> + Send
    where
        Self: Sized;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BulkInsertResult {
    /// Rows sent to the database
    pub attempted: usize,
    /// Rows actually written
    pub inserted: usize,
    /// Rows dropped because their `video_id` was already stored
    pub skipped: usize,
}

impl BulkInsertResult {
    pub fn new(attempted: usize, inserted: usize) -> Self {
        Self {
            attempted,
            inserted,
            skipped: attempted.saturating_sub(inserted),
        }
    }
}
