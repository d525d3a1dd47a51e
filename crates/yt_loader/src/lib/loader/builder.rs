use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use yt_datastore::DataStore;

use crate::{reader::dated_file_path, YtLoader, DEFAULT_DATA_DIR};

pub struct YtLoaderBuilder<D = ()> {
    data_dir: PathBuf,
    date: NaiveDate,
    data_file: Option<PathBuf>,
    store: D,
}

impl YtLoaderBuilder {
    /// Starts from today's file under `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            date: Local::now().date_naive(),
            data_file: None,
            store: (),
        }
    }
}

impl Default for YtLoaderBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl<D> YtLoaderBuilder<D> {
    pub fn store<D2: DataStore + Send + 'static>(self, store: D2) -> YtLoaderBuilder<D2> {
        YtLoaderBuilder {
            data_dir: self.data_dir,
            date: self.date,
            data_file: self.data_file,
            store,
        }
    }

    /// Load the dump of `date` instead of today's
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Load an explicit file, ignoring the data directory and date
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }
}

impl<D> YtLoaderBuilder<D>
where
    D: DataStore + Send + 'static,
{
    pub fn build(self) -> YtLoader<D> {
        let data_file = self
            .data_file
            .unwrap_or_else(|| dated_file_path(&self.data_dir, self.date));

        YtLoader {
            store: self.store,
            data_file,
        }
    }
}
