use derive_more::Display;

#[derive(Debug, Display)]
pub enum DbError {
    #[display(fmt = "Environment Error: {}", _0)]
    EnvironmentError(String),
    #[display(fmt = "Library Error: Diesel Error: {}", _0)]
    DieselError(diesel::result::Error),
    #[display(fmt = "Library Error: Connection Error: {}", _0)]
    ConnectionError(diesel::ConnectionError),
    #[display(fmt = "Library Error: Pooling Error: {}", _0)]
    R2D2Error(r2d2::Error),
    #[display(fmt = "Library Error: Migration Error: {}", _0)]
    MigrationError(String),
    #[display(fmt = "Schema Error: {}", _0)]
    SchemaMismatch(String),
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::DieselError(err) => Some(err),
            DbError::ConnectionError(err) => Some(err),
            DbError::R2D2Error(err) => Some(err),
            _ => None,
        }
    }
}

impl From<r2d2::Error> for DbError {
    fn from(err: r2d2::Error) -> DbError {
        DbError::R2D2Error(err)
    }
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> DbError {
        DbError::DieselError(err)
    }
}

impl From<diesel::ConnectionError> for DbError {
    fn from(err: diesel::ConnectionError) -> DbError {
        DbError::ConnectionError(err)
    }
}
