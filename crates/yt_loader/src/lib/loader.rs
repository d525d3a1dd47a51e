use std::path::{Path, PathBuf};

use anyhow::Context;
use yt_datastore::{BulkInsertResult, DataStore, RawVideoRecord, VideoRow};

use crate::reader::{read_records, ReadOutcome};

pub mod builder;

/// What a completed run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary {
    Loaded(BulkInsertResult),
    NothingToLoad(SkipReason),
}

/// Why the data file yielded no records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    NotFound,
    ParseError,
    Unreadable,
}

/// Loads one daily dump into the store: schema, read, insert, close.
#[derive(Debug)]
pub struct YtLoader<D>
where
    D: DataStore + Send + 'static,
{
    pub(crate) store: D,
    pub(crate) data_file: PathBuf,
}

impl<D> YtLoader<D>
where
    D: DataStore + Send + 'static,
{
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Runs the load and closes the store afterwards, whatever the outcome
    #[tracing::instrument(skip(self), fields(data_file = %self.data_file.display()))]
    pub async fn run(self) -> anyhow::Result<RunSummary> {
        let YtLoader {
            mut store,
            data_file,
        } = self;

        let outcome = load(&mut store, &data_file).await;

        if let Err(e) = store.close().await {
            tracing::warn!(error = ?e, "Failed to close database connection");
        }

        outcome
    }
}

async fn load<D: DataStore>(store: &mut D, data_file: &Path) -> anyhow::Result<RunSummary> {
    store
        .ensure_schema()
        .await
        .context("Failed to ensure youtube schema")?;

    let reason = match read_records(data_file) {
        ReadOutcome::Loaded(records) => return insert(store, records).await,
        ReadOutcome::Empty => SkipReason::Empty,
        ReadOutcome::NotFound => SkipReason::NotFound,
        ReadOutcome::ParseError(_) => SkipReason::ParseError,
        ReadOutcome::Unreadable(_) => SkipReason::Unreadable,
    };

    tracing::info!(?reason, "Nothing to load");
    Ok(RunSummary::NothingToLoad(reason))
}

async fn insert<D: DataStore>(
    store: &mut D,
    records: Vec<RawVideoRecord>,
) -> anyhow::Result<RunSummary> {
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            VideoRow::try_from(record).with_context(|| format!("Invalid record at index {idx}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .inspect_err(|e| tracing::error!(error = ?e, "Failed to prepare records, nothing inserted"))?;

    tracing::info!(count = rows.len(), "Inserting records");
    let result = store
        .bulk_insert_videos(&rows)
        .await
        .context("Failed to load data into the database")?;

    tracing::info!(
        inserted = result.inserted,
        skipped = result.skipped,
        "Successfully loaded data into the database"
    );

    Ok(RunSummary::Loaded(result))
}
