mod loader;
pub mod reader;
pub mod tracing;

pub use loader::{builder::YtLoaderBuilder, RunSummary, SkipReason, YtLoader};
pub use reader::{dated_file_path, read_records, ReadOutcome, DEFAULT_DATA_DIR};
