use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // The pool gave up waiting for a free connection
            sqlx::Error::PoolTimedOut => {
                Self::Timeout("no database connection became available".to_string())
            }
            other => Self::Database(other),
        }
    }
}
