use dotenv::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

error_chain! {
    errors {
        MissingVar(name: &'static str) {
            description("missing environment variable")
            display("missing environment variable: {}", name)
        }
        InvalidValue(name: &'static str, value: String) {
            description("invalid configuration value")
            display("invalid value for {}: {}", name, value)
        }
    }
}

/// Runtime settings for the database pool. Rocket reads its own
/// address/port settings separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub pool_size: u32,
    pub connection_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Settings> {
        dotenv().ok();
        Settings::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| Error::from(ErrorKind::MissingVar("DATABASE_URL")))?;

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .chain_err(|| ErrorKind::InvalidValue("DATABASE_POOL_SIZE", raw.clone()))?,
            None => DEFAULT_POOL_SIZE,
        };
        // r2d2 refuses an empty pool
        if pool_size == 0 {
            bail!(ErrorKind::InvalidValue("DATABASE_POOL_SIZE", "0".into()));
        }

        let timeout_secs = match lookup("DATABASE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .chain_err(|| ErrorKind::InvalidValue("DATABASE_TIMEOUT_SECS", raw.clone()))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!(ErrorKind::InvalidValue("DATABASE_TIMEOUT_SECS", "0".into()));
        }

        Ok(Settings {
            database_url,
            pool_size,
            connection_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
