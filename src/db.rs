use std::sync::OnceLock;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::config::Config;
use crate::errors::DbError;
use crate::metadata::METADATA;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Handle to the test database: the pool plus the URL it was built from.
pub struct Database {
    url: String,
    pool: Pool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool", &self.pool.state())
            .finish_non_exhaustive()
    }
}

impl Database {
    pub fn connect(config: &Config) -> Result<Self, DbError> {
        config.validate()?;
        let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
        let pool = r2d2::Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connect_timeout)
            .build(manager)?;
        log::info!("connected to test database (pool size {})", config.pool_size);

        Ok(Database {
            url: config.database_url.clone(),
            pool,
        })
    }

    pub fn from_env() -> Result<Self, DbError> {
        Self::connect(&Config::from_env()?)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn get(&self) -> Result<PooledConnection, DbError> {
        Ok(self.pool.get()?)
    }

    /// Opens a connection outside the pool.
    pub fn establish(&self) -> Result<PgConnection, DbError> {
        Ok(PgConnection::establish(&self.url)?)
    }

    /// Opens a connection whose work is never committed. Everything done
    /// through it disappears once it is dropped.
    pub fn test_connection(&self) -> Result<PgConnection, DbError> {
        let mut connection = self.establish()?;
        connection.begin_test_transaction()?;
        Ok(connection)
    }

    /// Creates the `notes` table by running pending migrations.
    pub fn setup(&self) -> Result<(), DbError> {
        let mut connection = self.establish()?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| DbError::MigrationError(err.to_string()))?;
        for version in &applied {
            log::info!("applied migration {}", version);
        }
        Ok(())
    }

    pub fn teardown(&self) -> Result<(), DbError> {
        let mut connection = self.establish()?;
        let reverted = connection
            .revert_all_migrations(MIGRATIONS)
            .map_err(|err| DbError::MigrationError(err.to_string()))?;
        for version in &reverted {
            log::info!("reverted migration {}", version);
        }
        Ok(())
    }

    pub fn reset(&self) -> Result<(), DbError> {
        self.teardown()?;
        self.setup()
    }

    /// Validates the live tables against their descriptors.
    pub fn check(&self) -> Result<(), DbError> {
        let mut connection = self.get()?;
        METADATA.validate(&mut connection)
    }
}

static SHARED: OnceLock<Database> = OnceLock::new();

/// Process-wide handle built from the environment on first use.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is missing or the database is unreachable, the
/// same way a test suite's setup would fail.
pub fn shared() -> &'static Database {
    SHARED.get_or_init(|| match Database::from_env() {
        Ok(database) => database,
        Err(err) => panic!("failed to create the test database handle: {}", err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Nothing listens on port 1; validation must fail before any connect attempt.
    const UNREACHABLE: &str = "postgres://localhost:1/notes";

    #[test]
    fn zero_pool_size_is_an_error_not_a_panic() {
        let err = Database::connect(&Config::new(UNREACHABLE).with_pool_size(0)).unwrap_err();
        assert!(matches!(err, DbError::EnvironmentError(_)), "{}", err);
    }

    #[test]
    fn zero_connect_timeout_is_an_error_not_a_panic() {
        let config = Config::new(UNREACHABLE).with_connect_timeout(Duration::ZERO);
        let err = Database::connect(&config).unwrap_err();
        assert!(matches!(err, DbError::EnvironmentError(_)), "{}", err);
    }
}
