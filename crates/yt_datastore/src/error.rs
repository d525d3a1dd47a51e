use crate::duration::DurationParseError;

#[derive(Debug, thiserror::Error)]
pub enum DataStoreError {
    #[error("Failed to connect to postgres at {target}")]
    Connection {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to create youtube schema")]
    Schema(#[source] sqlx::Error),

    #[error("Failed to insert videos into {table}")]
    Insert {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to close database connection")]
    Close(#[source] sqlx::Error),
}

/// Reasons a loosely-typed record cannot become a row
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid duration for video {video_id}")]
    InvalidDuration {
        video_id: String,
        #[source]
        source: DurationParseError,
    },

    #[error("Invalid publishedAt '{value}' for video {video_id}")]
    InvalidTimestamp { video_id: String, value: String },
}
