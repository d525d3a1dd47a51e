//! # Daily dump reader
//!
//! Reads the `YT_data_<date>.json` files produced by the extraction step.
//! A file that is missing, empty or broken is not an error for the run, it
//! just means there is nothing to load; [`ReadOutcome`] says which.

use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use yt_datastore::RawVideoRecord;

pub const DEFAULT_DATA_DIR: &str = "./data";

/// `<data_dir>/YT_data_<YYYY-MM-DD>.json`
pub fn dated_file_path(data_dir: impl AsRef<Path>, date: NaiveDate) -> PathBuf {
    data_dir
        .as_ref()
        .join(format!("YT_data_{}.json", date.format("%Y-%m-%d")))
}

#[derive(Debug)]
pub enum ReadOutcome {
    Loaded(Vec<RawVideoRecord>),
    /// The file holds an empty array
    Empty,
    NotFound,
    /// Not a JSON array of video objects
    ParseError(serde_json::Error),
    Unreadable(io::Error),
}

#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_records(path: &Path) -> ReadOutcome {
    tracing::info!("Reading data from {}", path.display());

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(error = %e, "Data file was not found");
            return ReadOutcome::NotFound;
        }
        Err(e) => {
            tracing::error!(error = ?e, "Failed to open data file");
            return ReadOutcome::Unreadable(e);
        }
    };

    match serde_json::from_reader::<_, Vec<RawVideoRecord>>(BufReader::new(file)) {
        Ok(records) if records.is_empty() => {
            tracing::info!("Data file contains no records");
            ReadOutcome::Empty
        }
        Ok(records) => {
            tracing::info!(count = records.len(), "Successfully read records");
            ReadOutcome::Loaded(records)
        }
        Err(e) if e.is_io() => {
            tracing::error!(error = ?e, "Failed to read data file");
            ReadOutcome::Unreadable(e.into())
        }
        Err(e) => {
            tracing::error!(error = %e, "Error decoding JSON from data file");
            ReadOutcome::ParseError(e)
        }
    }
}
