use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::connection::Connector;
use crate::error::Result;
use crate::options::PoolTarget;
use crate::pool::ConnectionPool;
use crate::probe::DEFAULT_PROBE_INTERVAL;

/// Cache of connection pools keyed by configuration.
///
/// Structurally equal configurations always resolve to the same pool: at
/// most one pool exists per cache key for the life of the registry. Entries
/// are never evicted on their own; [`PoolRegistry::shutdown`] is the only
/// teardown path.
pub struct PoolRegistry<C: Connector> {
    pools: Arc<DashMap<String, Arc<ConnectionPool<C>>>>,
    connector: Arc<C>,
    probe_interval: Duration,
}

impl<C: Connector> PoolRegistry<C> {
    pub fn new(connector: C) -> Self {
        Self::with_probe_interval(connector, DEFAULT_PROBE_INTERVAL)
    }

    pub fn with_probe_interval(connector: C, probe_interval: Duration) -> Self {
        Self {
            pools: Arc::new(DashMap::new()),
            connector: Arc::new(connector),
            probe_interval,
        }
    }

    /// Returns the pool for this configuration, creating it on first use.
    ///
    /// A hit returns the existing pool as-is, without revalidating its
    /// connections, and logs the pool's current queued-request depth. A miss
    /// fails only on malformed configuration; connections are opened later,
    /// on demand.
    pub fn get_or_create(&self, target: impl Into<PoolTarget>) -> Result<Arc<ConnectionPool<C>>> {
        let target = target.into();
        let key = target.cache_key();

        // The entry guard keeps key lookup and insertion atomic, so two
        // concurrent callers with equal configurations get the same pool.
        match self.pools.entry(key) {
            Entry::Occupied(entry) => {
                let pool = Arc::clone(entry.get());
                log::info!(
                    "connection pool hit: {} queued requests",
                    pool.queued_requests()
                );
                Ok(pool)
            }
            Entry::Vacant(entry) => {
                let options = target.resolve()?;
                log::info!(
                    "creating connection pool for {} (connection limit {})",
                    options.host,
                    options.connection_limit()
                );

                let pool = Arc::new(ConnectionPool::new(
                    Arc::clone(&self.connector),
                    options,
                    self.probe_interval,
                ));
                entry.insert(Arc::clone(&pool));
                Ok(pool)
            }
        }
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Closes every pool and clears the registry.
    ///
    /// Pools otherwise live for the life of the registry; this is an
    /// explicit opt-in teardown for embedders that want a clean exit.
    pub async fn shutdown(&self) {
        let pools: Vec<Arc<ConnectionPool<C>>> = self
            .pools
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        self.pools.clear();

        for pool in &pools {
            pool.close().await;
        }

        log::info!("closed {} connection pools", pools.len());
    }
}

impl<C: Connector> Clone for PoolRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            pools: Arc::clone(&self.pools),
            connector: Arc::clone(&self.connector),
            probe_interval: self.probe_interval,
        }
    }
}
