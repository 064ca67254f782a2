use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use snafu::{ResultExt as _, Snafu};

use crate::database::DatabaseConfig;

#[derive(Debug, Snafu)]
#[snafu(display("invalid environment configuration: {source}"))]
pub struct ConfigError {
    source: envy::Error,
}

/// Process configuration, read from environment variables (and a `.env` file when present).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,
    #[serde(flatten)]
    pub database: DatabaseConfig,
    /// Directory for the rolling JSON log file. Only the console is logged to when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_host() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        envy::from_env::<Config>().context(ConfigSnafu)
    }

    pub fn from_iter<I>(vars: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).context(ConfigSnafu)
    }
}
