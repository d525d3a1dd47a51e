use std::fmt;

use sqlx::postgres::PgConnectOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Connection settings for the target PostgreSQL database
#[derive(Clone, PartialEq, Eq)]
pub struct PgConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl PgConfig {
    pub const DEFAULT_HOST: &str = "localhost";

    pub const HOST_VAR: &str = "PG_HOST";
    pub const DATABASE_VAR: &str = "POSTGRES_DB";
    pub const USER_VAR: &str = "POSTGRES_USER";
    pub const PASSWORD_VAR: &str = "POSTGRES_PASSWORD";
    pub const PORT_VAR: &str = "PG_PORT";

    /// Reads the connection settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from any key lookup, keyed by the environment
    /// variable names. The host falls back to [`Self::DEFAULT_HOST`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port = required(Self::PORT_VAR)?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid {
                name: Self::PORT_VAR,
                value: port.clone(),
            })?;

        Ok(Self {
            host: lookup(Self::HOST_VAR)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            database: required(Self::DATABASE_VAR)?,
            user: required(Self::USER_VAR)?,
            password: required(Self::PASSWORD_VAR)?,
            port,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    /// `host:port/database`, safe to log
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for PgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("port", &self.port)
            .finish()
    }
}
