use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser};
use yt_datastore::{ConfigError, PgConfig, PgDataStore};
use yt_loader::{tracing::init_tracing_subscriber, RunSummary, YtLoaderBuilder, DEFAULT_DATA_DIR};

#[derive(Parser)]
#[command(
    name = "yt-loader",
    about = "Loads the daily YouTube video metadata dump into PostgreSQL"
)]
struct Cli {
    /// Directory holding the YT_data_<date>.json files
    #[arg(long, env = "YT_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Date of the dump to load (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Load this file instead of the dated dump
    #[arg(long, conflicts_with = "date")]
    file: Option<PathBuf>,

    /// Exit with a non-zero status when the run fails
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    db: DbArgs,
}

#[derive(Args)]
struct DbArgs {
    /// Database host
    #[arg(long, env = "PG_HOST")]
    host: Option<String>,

    /// Database port
    #[arg(long, env = "PG_PORT")]
    port: Option<String>,

    /// Database name
    #[arg(long, env = "POSTGRES_DB")]
    database: Option<String>,

    /// Database user
    #[arg(long, env = "POSTGRES_USER")]
    user: Option<String>,

    /// Database password
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl DbArgs {
    fn into_config(self) -> Result<PgConfig, ConfigError> {
        PgConfig::from_lookup(|key| match key {
            PgConfig::HOST_VAR => self.host.clone(),
            PgConfig::PORT_VAR => self.port.clone(),
            PgConfig::DATABASE_VAR => self.database.clone(),
            PgConfig::USER_VAR => self.user.clone(),
            PgConfig::PASSWORD_VAR => self.password.clone(),
            _ => None,
        })
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let config = cli
        .db
        .into_config()
        .context("Invalid database configuration")?;

    let store = PgDataStore::connect(&config)
        .await
        .context("Database connection failed")?;

    let mut builder = YtLoaderBuilder::new(cli.data_dir);
    if let Some(date) = cli.date {
        builder = builder.date(date);
    }
    if let Some(file) = cli.file {
        builder = builder.data_file(file);
    }

    builder.store(store).build().run().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    if let Err(e) = init_tracing_subscriber() {
        eprintln!("{e:?}");
        return ExitCode::FAILURE;
    }

    let strict = cli.strict;
    match run(cli).await {
        Ok(summary) => {
            tracing::info!(?summary, "Run finished");
            ExitCode::SUCCESS
        }
        // failures are log-only unless --strict is given
        Err(e) => {
            tracing::error!(error = ?e, "An error occurred");
            if strict {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
