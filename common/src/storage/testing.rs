//! In-memory stand-ins for the MySQL pool, used by tests across the workspace.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    db::{CatalogConnection, ConnectionPool},
    store::AppStore,
    types::app::App,
};
use crate::error::AppError;

/// What a [`CountingPool`] does when it is used.
#[derive(Clone, Debug)]
pub enum PoolBehavior {
    /// Serves these rows, filtered by name like the real query.
    Rows(Vec<App>),
    FailAcquire,
    /// Every connection stays busy until the pool's own wait deadline passes.
    Exhausted,
    FailQuery,
    /// Leases fine, but pings and queries never complete.
    Hang,
}

#[derive(Default, Debug)]
struct PoolCounters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Pool that counts every lease and every release. Clones share counters.
#[derive(Clone, Debug)]
pub struct CountingPool {
    behavior: PoolBehavior,
    counters: Arc<PoolCounters>,
}

impl CountingPool {
    pub fn new(behavior: PoolBehavior) -> Self {
        Self {
            behavior,
            counters: Arc::new(PoolCounters::default()),
        }
    }

    pub fn acquired(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Wraps a clone of this pool in an [`AppStore`] with short timeouts.
    pub fn store(&self) -> AppStore<Self> {
        AppStore::new(
            self.clone(),
            Duration::from_millis(100),
            Duration::from_millis(100),
        )
    }
}

pub struct CountingConnection {
    behavior: PoolBehavior,
    counters: Arc<PoolCounters>,
}

impl Drop for CountingConnection {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionPool for CountingPool {
    type Connection = CountingConnection;

    async fn lease(&self) -> Result<Self::Connection, AppError> {
        match self.behavior {
            PoolBehavior::FailAcquire => return Err(AppError::Database(sqlx::Error::PoolClosed)),
            // Same conversion the MySQL pool's lease goes through
            PoolBehavior::Exhausted => return Err(sqlx::Error::PoolTimedOut.into()),
            _ => {}
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(CountingConnection {
            behavior: self.behavior.clone(),
            counters: Arc::clone(&self.counters),
        })
    }
}

#[async_trait]
impl CatalogConnection for CountingConnection {
    async fn ping(&mut self) -> Result<(), AppError> {
        match &self.behavior {
            PoolBehavior::FailQuery => Err(simulated_failure("ping")),
            PoolBehavior::Hang => std::future::pending().await,
            _ => Ok(()),
        }
    }

    async fn find_by_name(
        &mut self,
        pattern: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<App>, AppError> {
        match &self.behavior {
            PoolBehavior::Rows(rows) => {
                let needle = pattern.trim_matches('%').to_lowercase();
                let skip = usize::try_from(offset).unwrap_or(usize::MAX);
                let take = usize::try_from(limit).unwrap_or(usize::MAX);
                Ok(rows
                    .iter()
                    .filter(|app| {
                        app.name()
                            .is_some_and(|name| name.to_lowercase().contains(&needle))
                    })
                    .skip(skip)
                    .take(take)
                    .cloned()
                    .collect())
            }
            PoolBehavior::Hang => std::future::pending().await,
            PoolBehavior::FailAcquire | PoolBehavior::Exhausted | PoolBehavior::FailQuery => {
                Err(simulated_failure("query"))
            }
        }
    }
}

fn simulated_failure(what: &str) -> AppError {
    AppError::Database(sqlx::Error::Protocol(format!("simulated {what} failure")))
}

/// A catalog row shaped like the Play Store dataset.
pub fn sample_app(id: u64, name: &str) -> App {
    let Value::Object(fields) = json!({
        "app_id": id,
        "name": name,
        "category": "TRAVEL_AND_LOCAL",
        "rating": 4.3,
        "installs": "1,000,000+",
        "price": "0",
    }) else {
        return App::default();
    };
    App::from_fields(fields)
}
