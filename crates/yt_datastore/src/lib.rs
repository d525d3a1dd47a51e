//! # DataStore Module
//!
//! This module provides functionality for loading pre-fetched YouTube video
//! metadata into a PostgreSQL database.
//!
//! The module uses sqlx for database operations and provides an abstraction layer
//! over schema creation and the idempotent bulk insert of video rows.

mod config;
mod datastore;
mod domain;
mod duration;
mod error;

pub use config::{ConfigError, PgConfig};
pub use datastore::postgres::{PgDataStore, MAX_ROWS_PER_STATEMENT, VIDEOS_TABLE};
pub use datastore::{BulkInsertResult, DataStore};
pub use domain::{RawVideoRecord, VideoRow};
pub use duration::{DurationParseError, IsoDuration};
pub use error::{DataStoreError, RecordError};
