use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    pool::PoolConnection,
    Connection, MySql, MySqlPool,
};
use tracing::debug;

use super::types::app::App;
use crate::{error::AppError, utils::config::AppConfig};

pub const SQL_FIND_BY_NAME: &str = "SELECT * FROM apps WHERE name LIKE ? LIMIT ? OFFSET ?";

/// A bounded pool handing out catalog connections.
///
/// A leased connection goes back to the pool when it is dropped, so holding it
/// in a local binding is enough to release it on every exit path.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    type Connection: CatalogConnection;

    async fn lease(&self) -> Result<Self::Connection, AppError>;
}

/// Operations available on a leased catalog connection.
#[async_trait]
pub trait CatalogConnection: Send {
    async fn ping(&mut self) -> Result<(), AppError>;

    /// Runs [`SQL_FIND_BY_NAME`] with `pattern` bound as the `LIKE` operand.
    async fn find_by_name(
        &mut self,
        pattern: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<App>, AppError>;
}

#[async_trait]
impl ConnectionPool for MySqlPool {
    type Connection = PoolConnection<MySql>;

    async fn lease(&self) -> Result<Self::Connection, AppError> {
        Ok(self.acquire().await?)
    }
}

#[async_trait]
impl CatalogConnection for PoolConnection<MySql> {
    async fn ping(&mut self) -> Result<(), AppError> {
        Connection::ping(&mut **self).await?;
        Ok(())
    }

    async fn find_by_name(
        &mut self,
        pattern: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<App>, AppError> {
        let rows = sqlx::query(SQL_FIND_BY_NAME)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **self)
            .await?;

        Ok(rows.iter().map(App::from_row).collect())
    }
}

/// # Build the MySQL connection pool
///
/// Connections are opened lazily; call `AppStore::verify_reachable` to find out
/// whether the database actually answers.
pub fn connect_pool(config: &AppConfig) -> MySqlPool {
    let mut options = MySqlConnectOptions::new()
        .host(&config.sql_host)
        .port(config.sql_port)
        .database(&config.sql_db)
        .timezone(Some(config.sql_timezone.clone()));

    if let Some(user) = &config.sql_user {
        options = options.username(user);
    }
    if let Some(password) = &config.sql_pass {
        options = options.password(password);
    }

    debug!(
        host = %config.sql_host,
        port = config.sql_port,
        database = %config.sql_db,
        max_connections = config.sql_connection_limit,
        "Configuring MySQL pool"
    );

    MySqlPoolOptions::new()
        .max_connections(config.sql_connection_limit)
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy_with(options)
}
