use std::time::Duration;

use async_trait::async_trait;
use sqlx::MySqlPool;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{
    db::{connect_pool, CatalogConnection, ConnectionPool},
    types::app::App,
};
use crate::{error::AppError, utils::config::AppConfig};

/// Read access to the app catalog, as seen by the request handlers.
#[async_trait]
pub trait AppCatalog: Send + Sync {
    /// Returns at most `limit` apps whose name contains `query`, skipping the
    /// first `offset` matches.
    async fn find(&self, query: &str, limit: u64, offset: u64) -> Result<Vec<App>, AppError>;
}

/// Catalog backed by a connection pool. Every call leases exactly one
/// connection and gives it back before returning, whatever the outcome.
pub struct AppStore<P> {
    pool: P,
    acquire_timeout: Duration,
    query_timeout: Duration,
}

impl AppStore<MySqlPool> {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            connect_pool(config),
            config.acquire_timeout(),
            config.query_timeout(),
        )
    }
}

impl<P: ConnectionPool> AppStore<P> {
    pub const fn new(pool: P, acquire_timeout: Duration, query_timeout: Duration) -> Self {
        Self {
            pool,
            acquire_timeout,
            query_timeout,
        }
    }

    pub const fn pool(&self) -> &P {
        &self.pool
    }

    async fn lease(&self) -> Result<P::Connection, AppError> {
        timeout(self.acquire_timeout, self.pool.lease())
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "no database connection available within {:?}",
                    self.acquire_timeout
                ))
            })?
    }

    /// Leases a connection, pings the server and hands the connection back.
    pub async fn verify_reachable(&self) -> Result<(), AppError> {
        let mut conn = self
            .lease()
            .await
            .map_err(|e| AppError::DatabaseUnavailable(e.to_string()))?;

        info!("Pinging database...");
        let pinged = timeout(self.query_timeout, conn.ping())
            .await
            .map_err(|_| AppError::DatabaseUnavailable("ping timed out".to_string()))?;
        pinged.map_err(|e| AppError::DatabaseUnavailable(e.to_string()))
    }
}

/// Wraps the user's text for a substring `LIKE` match.
pub fn like_pattern(query: &str) -> String {
    format!("%{query}%")
}

#[async_trait]
impl<P> AppCatalog for AppStore<P>
where
    P: ConnectionPool + 'static,
{
    async fn find(&self, query: &str, limit: u64, offset: u64) -> Result<Vec<App>, AppError> {
        let pattern = like_pattern(query);
        let mut conn = self.lease().await?;

        let apps = timeout(
            self.query_timeout,
            conn.find_by_name(&pattern, limit, offset),
        )
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "catalog query did not finish within {:?}",
                self.query_timeout
            ))
        })??;

        debug!(query, limit, offset, rows = apps.len(), "Catalog search finished");
        Ok(apps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{sample_app, CountingPool, PoolBehavior};

    #[test]
    fn like_pattern_wraps_query_in_wildcards() {
        assert_eq!(like_pattern("maps"), "%maps%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[tokio::test]
    async fn successful_find_releases_its_connection() {
        let pool = CountingPool::new(PoolBehavior::Rows(vec![
            sample_app(1, "Google Maps"),
            sample_app(2, "Maps.me"),
            sample_app(3, "Calculator"),
        ]));

        let apps = pool.store().find("maps", 10, 0).await.expect("find");

        assert_eq!(apps.len(), 2);
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[tokio::test]
    async fn failed_query_still_releases_its_connection() {
        let pool = CountingPool::new(PoolBehavior::FailQuery);

        let result = pool.store().find("maps", 10, 0).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[tokio::test]
    async fn failed_acquire_holds_nothing() {
        let pool = CountingPool::new(PoolBehavior::FailAcquire);

        let result = pool.store().find("maps", 10, 0).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(pool.acquired(), 0);
        assert_eq!(pool.released(), 0);
    }

    #[tokio::test]
    async fn exhausted_pool_is_a_timeout_not_a_database_error() {
        let pool = CountingPool::new(PoolBehavior::Exhausted);

        let result = pool.store().find("maps", 10, 0).await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
        assert_eq!(pool.acquired(), 0);
        assert_eq!(pool.released(), 0);
    }

    #[tokio::test]
    async fn slow_query_times_out_and_releases() {
        let pool = CountingPool::new(PoolBehavior::Hang);

        let result = pool.store().find("maps", 10, 0).await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[tokio::test]
    async fn repeated_calls_never_leak() {
        let pool = CountingPool::new(PoolBehavior::Rows(vec![sample_app(1, "Maps")]));
        let store = pool.store();

        for _ in 0..5 {
            store.find("maps", 10, 0).await.expect("find");
        }

        assert_eq!(pool.acquired(), 5);
        assert_eq!(pool.released(), 5);
    }

    #[tokio::test]
    async fn limit_and_offset_bound_the_window() {
        let rows = (1..=25).map(|i| sample_app(i, &format!("Maps {i}"))).collect();
        let pool = CountingPool::new(PoolBehavior::Rows(rows));

        let apps = pool.store().find("maps", 10, 20).await.expect("find");

        assert_eq!(apps.len(), 5);
        assert_eq!(apps.first().and_then(App::name), Some("Maps 21"));
    }

    #[tokio::test]
    async fn verify_reachable_pings_and_releases() {
        let pool = CountingPool::new(PoolBehavior::Rows(Vec::new()));

        pool.store().verify_reachable().await.expect("reachable");

        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[tokio::test]
    async fn verify_reachable_reports_unavailable_database() {
        let pool = CountingPool::new(PoolBehavior::FailAcquire);

        let result = pool.store().verify_reachable().await;

        assert!(matches!(result, Err(AppError::DatabaseUnavailable(_))));
        assert_eq!(pool.released(), 0);
    }

    #[tokio::test]
    async fn failed_ping_reports_unavailable_and_releases() {
        let pool = CountingPool::new(PoolBehavior::FailQuery);

        let result = pool.store().verify_reachable().await;

        assert!(matches!(result, Err(AppError::DatabaseUnavailable(_))));
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }
}
