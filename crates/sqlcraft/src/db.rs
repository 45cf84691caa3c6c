//! Database handle tying together an executor, a cache and logging.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Level;

use crate::cache::{Cache, NoopCache};
use crate::client::Executor;
use crate::config::DbConfig;
use crate::error::CraftResult;
use crate::qb::{BuiltQuery, Delete, Insert, Query, Selectable, Table, Update};
use crate::row::Row;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// Entry point for building and running statements.
///
/// The cache is an explicit collaborator: [`Db::new`] starts with [`NoopCache`],
/// and [`Db::with_cache`] swaps in another implementation.
///
/// ```ignore
/// let db = Db::new(executor).with_cache(MemoryCache::new(256));
/// let weather = db.table("Weather");
/// let rows = db
///     .query([weather.all()])
///     .from(&weather)
///     .filter(weather.col("temperature").lt(0))
///     .fetch_all(&db)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Db<E, C = NoopCache> {
    executor: E,
    cache: C,
    config: DbConfig,
}

impl<E: Executor> Db<E> {
    /// Create a handle with no caching.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            cache: NoopCache,
            config: DbConfig::default(),
        }
    }
}

impl<E: Executor, C: Cache> Db<E, C> {
    /// Replace the cache.
    pub fn with_cache<C2: Cache>(self, cache: C2) -> Db<E, C2> {
        Db {
            executor: self.executor,
            cache,
            config: self.config,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: DbConfig) -> Self {
        self.config = config;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    // ==================== Builders ====================

    /// Reference a table by name.
    pub fn table(&self, name: &str) -> Table {
        Table::new(name)
    }

    /// Reference a table with a known column list.
    pub fn define_table<I, S>(&self, name: &str, columns: I) -> Table
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table::define(name, columns)
    }

    /// Start a SELECT with the given columns.
    pub fn query<I, S>(&self, columns: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        Query::new().select(columns)
    }

    pub fn insert(&self, table: &Table) -> Insert {
        Insert::new(table)
    }

    pub fn update(&self, table: &Table) -> Update {
        Update::new(table)
    }

    pub fn delete(&self, table: &Table) -> Delete {
        Delete::new(table)
    }

    // ==================== Execution ====================

    /// Fetch rows for a rendered SELECT, consulting the cache first.
    ///
    /// The executor is called only on a miss, and its rows are stored under
    /// [`BuiltQuery::cache_key`].
    pub async fn fetch(&self, built: &BuiltQuery) -> CraftResult<Arc<Vec<Row>>> {
        if !self.config.cache_enabled {
            let rows = self.run_query(built, "off").await?;
            return Ok(Arc::new(rows));
        }

        let key = built.cache_key();
        if let Some(rows) = self.cache.get(&key) {
            self.log(built, "hit");
            return Ok(rows);
        }

        let rows = Arc::new(self.run_query(built, "miss").await?);
        self.cache.put(key, Arc::clone(&rows));
        Ok(rows)
    }

    /// Fetch rows without touching the cache.
    pub async fn fetch_uncached(&self, built: &BuiltQuery) -> CraftResult<Vec<Row>> {
        self.run_query(built, "off").await
    }

    /// Run a statement and return the number of affected rows.
    pub async fn execute(&self, built: &BuiltQuery) -> CraftResult<u64> {
        self.log(built, "off");
        let start = Instant::now();
        let result = self.executor.execute(&built.sql, &built.params).await;
        self.check_slow(built, start.elapsed());
        result
    }

    async fn run_query(&self, built: &BuiltQuery, cache: &'static str) -> CraftResult<Vec<Row>> {
        self.log(built, cache);
        let start = Instant::now();
        let result = self.executor.query(&built.sql, &built.params).await;
        self.check_slow(built, start.elapsed());
        result
    }

    fn log(&self, built: &BuiltQuery, cache: &'static str) {
        let sql = self.config.display_sql(&built.sql);
        emit_at_level!(
            self.config.level,
            target: "sqlcraft.sql",
            kind = built.kind.as_str(),
            param_count = built.params.len(),
            cache,
            sql = %sql,
        );
    }

    fn check_slow(&self, built: &BuiltQuery, elapsed: Duration) {
        let Some(threshold) = self.config.slow_query_threshold else {
            return;
        };
        if elapsed > threshold {
            tracing::warn!(
                target: "sqlcraft.sql",
                kind = built.kind.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                sql = %self.config.display_sql(&built.sql),
                "slow statement"
            );
        }
    }
}
