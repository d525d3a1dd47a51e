use sqlx::{
    postgres::{types::PgInterval, PgConnection},
    Connection, Postgres, QueryBuilder,
};

use crate::{
    datastore::{BulkInsertResult, DataStore},
    error::DataStoreError,
    PgConfig, VideoRow,
};

pub const VIDEOS_TABLE: &str = "youtube.raw_youtube_data";

/// PostgreSQL caps a statement at 65535 bind parameters; each row binds 7.
pub const MAX_ROWS_PER_STATEMENT: usize = 65535 / 7;

const CREATE_SCHEMA: &str = "CREATE SCHEMA IF NOT EXISTS youtube";

const CREATE_VIDEOS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS youtube.raw_youtube_data (
        video_id VARCHAR(11) PRIMARY KEY NOT NULL,
        video_title TEXT NOT NULL,
        upload_date TIMESTAMP,
        duration INTERVAL,
        video_views INT,
        likes_count INT,
        comments_count INT
    )
"#;

const INSERT_VIDEOS: &str = r#"
    INSERT INTO youtube.raw_youtube_data (
        video_id,
        video_title,
        upload_date,
        duration,
        video_views,
        likes_count,
        comments_count
    )
"#;

#[derive(Debug)]
pub struct PgDataStore {
    conn: PgConnection,
}

impl PgDataStore {
    /// Establish a single connection to the database described by `config`
    pub async fn connect(config: &PgConfig) -> Result<Self, DataStoreError> {
        tracing::info!(db = %config.target(), user = %config.user, "Connecting to PostgreSQL");

        let conn = PgConnection::connect_with(&config.connect_options())
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .map_err(|source| DataStoreError::Connection {
                target: config.target(),
                source,
            })?;

        tracing::info!("Connection to PostgreSQL successful");
        Ok(PgDataStore { conn })
    }

    /// Direct access to the connection, for ad-hoc queries
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}

impl DataStore for PgDataStore {
    async fn ensure_schema(&mut self) -> anyhow::Result<()> {
        let mut tx = self.conn.begin().await.map_err(DataStoreError::Schema)?;

        for statement in [CREATE_SCHEMA, CREATE_VIDEOS_TABLE] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .inspect_err(|e| tracing::error!(error = ?e, "Failed to create table"))
                .map_err(DataStoreError::Schema)?;
        }

        tx.commit().await.map_err(DataStoreError::Schema)?;

        tracing::info!(table = VIDEOS_TABLE, "Table created or already exists");
        Ok(())
    }

    async fn bulk_insert_videos(&mut self, rows: &[VideoRow]) -> anyhow::Result<BulkInsertResult> {
        if rows.is_empty() {
            return Ok(BulkInsertResult::default());
        }

        let insert_err = |source| DataStoreError::Insert {
            table: VIDEOS_TABLE,
            source,
        };

        let mut tx = self.conn.begin().await.map_err(insert_err)?;
        let mut inserted = 0u64;

        for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(INSERT_VIDEOS);
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.video_id.clone())
                    .push_bind(row.title.clone())
                    .push_bind(row.upload_date)
                    .push_bind(row.duration.map(PgInterval::from))
                    .push_bind(row.video_views)
                    .push_bind(row.likes_count)
                    .push_bind(row.comments_count);
            });
            builder.push(" ON CONFLICT (video_id) DO NOTHING");

            match builder.build().execute(&mut *tx).await {
                Ok(result) => inserted += result.rows_affected(),
                Err(e) => {
                    tracing::error!(
                        error = ?e,
                        attempted = rows.len(),
                        "Failed to insert videos, rolling back"
                    );
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(error = ?rollback_err, "Rollback failed");
                    }
                    return Err(insert_err(e).into());
                }
            }
        }

        tx.commit().await.map_err(insert_err)?;

        let result = BulkInsertResult::new(rows.len(), inserted as usize);
        tracing::info!(
            attempted = result.attempted,
            inserted = result.inserted,
            skipped = result.skipped,
            "Records inserted into {VIDEOS_TABLE}"
        );

        Ok(result)
    }

    async fn close(self) -> anyhow::Result<()> {
        self.conn.close().await.map_err(DataStoreError::Close)?;
        tracing::info!("Database connection closed");
        Ok(())
    }
}
