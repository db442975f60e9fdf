use std::time::Duration;

use crate::errors::DbError;

const DEFAULT_POOL_SIZE: u32 = 4;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the test database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub pool_size: u32,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Config {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Rejects settings r2d2 would panic on.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.pool_size == 0 {
            return Err(DbError::EnvironmentError(
                "pool size must be positive".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(DbError::EnvironmentError(
                "connect timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads `DATABASE_URL`, `DB_POOL_SIZE` and `DB_CONNECT_TIMEOUT`, after
    /// loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, DbError> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("DATABASE_URL")
            .ok_or_else(|| DbError::EnvironmentError("env DATABASE_URL is not set".to_string()))?;

        let pool_size = match var("DB_POOL_SIZE") {
            Some(raw) => parse_positive::<u32>("DB_POOL_SIZE", &raw)?,
            None => DEFAULT_POOL_SIZE,
        };

        let timeout_secs = match var("DB_CONNECT_TIMEOUT") {
            Some(raw) => parse_positive::<u64>("DB_CONNECT_TIMEOUT", &raw)?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        Ok(Config::new(database_url)
            .with_pool_size(pool_size)
            .with_connect_timeout(Duration::from_secs(timeout_secs)))
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, DbError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(DbError::EnvironmentError(format!(
            "{} must be a positive integer, got {:?}",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config = Config::from_vars(lookup(&[("DATABASE_URL", "postgres://localhost/notes")]))
            .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/notes");
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_url_is_an_environment_error() {
        let err = Config::from_vars(lookup(&[("DB_POOL_SIZE", "2")])).unwrap_err();
        assert!(matches!(err, DbError::EnvironmentError(ref msg) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn reads_pool_settings() {
        let config = Config::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/notes"),
            ("DB_POOL_SIZE", "10"),
            ("DB_CONNECT_TIMEOUT", " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        for bad in ["0", "-1", "four", ""] {
            let result = Config::from_vars(lookup(&[
                ("DATABASE_URL", "postgres://localhost/notes"),
                ("DB_POOL_SIZE", bad),
            ]));
            assert!(
                matches!(result, Err(DbError::EnvironmentError(_))),
                "accepted DB_POOL_SIZE={:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_zero_and_garbage_timeout() {
        for bad in ["0", "-1", "thirty", ""] {
            let result = Config::from_vars(lookup(&[
                ("DATABASE_URL", "postgres://localhost/notes"),
                ("DB_CONNECT_TIMEOUT", bad),
            ]));
            assert!(
                matches!(result, Err(DbError::EnvironmentError(_))),
                "accepted DB_CONNECT_TIMEOUT={:?}",
                bad
            );
        }
    }

    #[test]
    fn validate_rejects_zero_builder_values() {
        let config = Config::new("postgres://localhost/notes");
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.clone().with_pool_size(0).validate(),
            Err(DbError::EnvironmentError(ref msg)) if msg.contains("pool size")
        ));
        assert!(matches!(
            config.with_connect_timeout(Duration::ZERO).validate(),
            Err(DbError::EnvironmentError(ref msg)) if msg.contains("connect timeout")
        ));
    }
}
