use std::{str::FromStr, time::Duration};

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://batepapo.db";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 15_000;
pub const DEFAULT_STALE_AFTER_MS: u64 = 20_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub sweep_interval: Duration,
    pub stale_after: Duration,
}

impl Config {
    /// Reads the environment, `.env` included.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            database_url: dotenv::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned()),
            port: parse_or("PORT", dotenv::var("PORT").ok(), DEFAULT_PORT)?,
            sweep_interval: Duration::from_millis(parse_or(
                "SWEEP_INTERVAL_MS",
                dotenv::var("SWEEP_INTERVAL_MS").ok(),
                DEFAULT_SWEEP_INTERVAL_MS,
            )?),
            stale_after: Duration::from_millis(parse_or(
                "STALE_AFTER_MS",
                dotenv::var("STALE_AFTER_MS").ok(),
                DEFAULT_STALE_AFTER_MS,
            )?),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw.trim().parse().with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_falls_back() {
        assert_eq!(parse_or("PORT", None, DEFAULT_PORT).unwrap(), 5000);
    }

    #[test]
    fn present_value_is_parsed() {
        assert_eq!(parse_or("PORT", Some(" 8080 ".into()), DEFAULT_PORT).unwrap(), 8080);
    }

    #[test]
    fn garbage_is_an_error_naming_the_key() {
        let err = parse_or("SWEEP_INTERVAL_MS", Some("soon".into()), 1u64).unwrap_err();
        assert!(err.to_string().contains("SWEEP_INTERVAL_MS"));
    }
}
