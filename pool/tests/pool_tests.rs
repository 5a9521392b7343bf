use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pool::{Connection, ConnectionPool, Connector, PoolError, PoolOptions, Result};

#[derive(Default)]
struct MockConnector {
    opened: Arc<AtomicUsize>,
    pings: Arc<AtomicUsize>,
}

struct MockConnection {
    broken: bool,
    pings: Arc<AtomicUsize>,
}

impl MockConnection {
    fn fail(&mut self) {
        self.broken = true;
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Conn = MockConnection;

    async fn connect(&self, _options: &PoolOptions) -> Result<MockConnection> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            broken: false,
            pings: Arc::clone(&self.pings),
        })
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn ping(&mut self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_broken(&self) -> bool {
        self.broken
    }
}

fn pool_with_limit(
    limit: u32,
    probe_interval: Duration,
) -> (Arc<ConnectionPool<MockConnector>>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let connector = MockConnector::default();
    let opened = Arc::clone(&connector.opened);
    let pings = Arc::clone(&connector.pings);

    let mut options = PoolOptions::new("db.internal");
    options.connection_limit = Some(limit);

    let pool = Arc::new(ConnectionPool::new(
        Arc::new(connector),
        options.normalized(),
        probe_interval,
    ));
    (pool, opened, pings)
}

/// Returned leases are handed back on a spawned task; give it a beat.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}

#[tokio::test]
async fn reuses_idle_connections() {
    let (pool, opened, _) = pool_with_limit(4, Duration::from_secs(30));

    let lease = pool.acquire().await.unwrap();
    drop(lease);
    settle().await;

    let _lease = pool.acquire().await.unwrap();
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(pool.open_connections(), 1);
}

#[tokio::test]
async fn respects_the_connection_limit() {
    let (pool, opened, _) = pool_with_limit(1, Duration::from_secs(30));

    let first = pool.acquire().await.unwrap();

    let waiter = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
    };
    settle().await;

    assert_eq!(pool.queued_requests(), 1);

    drop(first);
    waiter.await.unwrap().unwrap();

    // The waiter reused the returned connection instead of opening another.
    assert_eq!(opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_broken_connection_is_destroyed_alone() {
    let (pool, opened, _) = pool_with_limit(2, Duration::from_secs(30));

    let healthy = pool.acquire().await.unwrap();
    let mut failing = pool.acquire().await.unwrap();
    assert_eq!(pool.open_connections(), 2);

    drop(healthy);
    failing.mark_broken();
    drop(failing);
    settle().await;

    // Only the failed connection went away.
    assert_eq!(pool.open_connections(), 1);

    // The pool is still usable and serves the surviving connection.
    let _lease = pool.acquire().await.unwrap();
    assert_eq!(opened.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn a_connection_reporting_an_error_is_not_reused() {
    let (pool, opened, _) = pool_with_limit(2, Duration::from_secs(30));

    let lease = pool.acquire().await.unwrap();
    lease.connection().await.fail();
    drop(lease);
    settle().await;

    assert_eq!(pool.open_connections(), 0);

    // A subsequent request against the same handle still succeeds.
    let _lease = pool.acquire().await.unwrap();
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    assert_eq!(pool.open_connections(), 1);
}

#[tokio::test]
async fn idle_connections_are_probed_on_the_interval() {
    let (pool, _, pings) = pool_with_limit(2, Duration::from_millis(25));

    let lease = pool.acquire().await.unwrap();
    drop(lease);
    settle().await;

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(pings.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn probing_stops_once_a_connection_is_destroyed() {
    let (pool, _, pings) = pool_with_limit(2, Duration::from_millis(25));

    let mut lease = pool.acquire().await.unwrap();
    lease.mark_broken();
    drop(lease);
    settle().await;
    assert_eq!(pool.open_connections(), 0);

    let observed = pings.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(pings.load(Ordering::SeqCst), observed);
}

#[tokio::test]
async fn close_tears_down_idle_connections() {
    let (pool, _, _) = pool_with_limit(2, Duration::from_secs(30));

    let lease = pool.acquire().await.unwrap();
    drop(lease);
    settle().await;
    assert_eq!(pool.open_connections(), 1);

    pool.close().await;

    assert_eq!(pool.open_connections(), 0);
    assert!(matches!(pool.acquire().await, Err(PoolError::Closed)));
}

#[tokio::test]
async fn a_leased_connection_is_destroyed_on_return_after_close() {
    let (pool, _, _) = pool_with_limit(2, Duration::from_secs(30));

    let lease = pool.acquire().await.unwrap();
    pool.close().await;

    drop(lease);
    settle().await;

    assert_eq!(pool.open_connections(), 0);
    assert_eq!(pool.idle_connections().await, 0);
}
