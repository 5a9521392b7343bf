use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, OwnedSemaphorePermit, Semaphore};

use crate::connection::{Connection, Connector};
use crate::error::{PoolError, Result};
use crate::options::PoolOptions;
use crate::probe::ProbeHandle;

/// One physical connection plus its recurring liveness probe.
///
/// Dropping a slot aborts the probe task, so a destroyed connection never
/// leaves background work behind.
struct Slot<C: Connection> {
    conn: Arc<Mutex<C>>,
    _probe: ProbeHandle,
}

/// A managed set of physical connections to one backend.
///
/// Shared via `Arc` by every caller that resolved the same cache key. The
/// pool opens connections on demand up to the configured limit, reuses idle
/// ones, and destroys individual connections that report errors.
pub struct ConnectionPool<C: Connector> {
    connector: Arc<C>,
    options: PoolOptions,
    probe_interval: Duration,
    idle: Mutex<VecDeque<Slot<C::Conn>>>,
    permits: Arc<Semaphore>,
    queued: AtomicUsize,
    open: AtomicUsize,
    closed: AtomicBool,
}

impl<C: Connector> ConnectionPool<C> {
    pub fn new(connector: Arc<C>, options: PoolOptions, probe_interval: Duration) -> Self {
        let limit = options.connection_limit() as usize;

        Self {
            connector,
            options,
            probe_interval,
            idle: Mutex::new(VecDeque::new()),
            permits: Arc::new(Semaphore::new(limit)),
            queued: AtomicUsize::new(0),
            open: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Borrows a connection, opening a new one when no idle connection is
    /// available and the pool is under its connection limit.
    pub async fn acquire(self: &Arc<Self>) -> Result<Lease<C>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PoolError::Closed);
        }

        self.queued.fetch_add(1, Ordering::SeqCst);
        let permit = Arc::clone(&self.permits).acquire_owned().await;
        self.queued.fetch_sub(1, Ordering::SeqCst);
        let permit = permit.map_err(|_| PoolError::Closed)?;

        let slot = match self.reuse_idle().await {
            Some(slot) => slot,
            None => self.open_slot().await?,
        };

        Ok(Lease {
            slot: Some(slot),
            pool: Arc::clone(self),
            permit: Some(permit),
            broken: false,
        })
    }

    /// Number of callers currently parked waiting for a free connection.
    pub fn queued_requests(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Number of physical connections currently established.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub async fn idle_connections(&self) -> usize {
        self.idle.lock().await.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Closes the pool: wakes queued callers with an error and tears down
    /// idle connections. Leased connections are destroyed as they return.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.permits.close();

        let mut idle = self.idle.lock().await;
        while let Some(slot) = idle.pop_front() {
            self.discard(slot).await;
        }
        drop(idle);

        log::info!("connection pool for {} closed", self.options.host);
    }

    async fn reuse_idle(&self) -> Option<Slot<C::Conn>> {
        loop {
            let slot = self.idle.lock().await.pop_front()?;

            let broken = slot
                .conn
                .try_lock()
                .map(|conn| conn.is_broken())
                .unwrap_or(false);
            if !broken {
                return Some(slot);
            }

            log::warn!("destroying broken connection instead of reusing it");
            self.discard(slot).await;
        }
    }

    async fn open_slot(&self) -> Result<Slot<C::Conn>> {
        let conn = self.connector.connect(&self.options).await?;
        let conn = Arc::new(Mutex::new(conn));
        let probe = ProbeHandle::spawn(Arc::downgrade(&conn), self.probe_interval);

        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("opened connection to {} ({} now open)", self.options.host, open);

        Ok(Slot { conn, _probe: probe })
    }

    async fn release(&self, slot: Slot<C::Conn>, broken: bool) {
        let broken = broken
            || slot
                .conn
                .try_lock()
                .map(|conn| conn.is_broken())
                .unwrap_or(false);

        if broken {
            log::warn!("destroying connection after error");
            self.discard(slot).await;
        } else if self.closed.load(Ordering::SeqCst) {
            self.discard(slot).await;
        } else {
            self.idle.lock().await.push_back(slot);
        }
    }

    async fn discard(&self, slot: Slot<C::Conn>) {
        if let Ok(mut conn) = slot.conn.try_lock() {
            let _ = conn.close().await;
        }

        let open = self.open.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        log::debug!("connection destroyed ({} still open)", open);
        // Dropping the slot aborts its probe task.
    }
}

impl<C: Connector> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("host", &self.options.host)
            .field("open", &self.open.load(Ordering::SeqCst))
            .field("queued", &self.queued.load(Ordering::SeqCst))
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

/// A borrowed connection. Returning it to the pool happens on drop; a lease
/// marked broken is destroyed instead of rejoining the idle set.
pub struct Lease<C: Connector> {
    slot: Option<Slot<C::Conn>>,
    pool: Arc<ConnectionPool<C>>,
    permit: Option<OwnedSemaphorePermit>,
    broken: bool,
}

impl<C: Connector> Lease<C> {
    /// Locks the underlying connection for use.
    pub async fn connection(&self) -> MutexGuard<'_, C::Conn> {
        self.slot
            .as_ref()
            .expect("lease slot is only vacated on drop")
            .conn
            .lock()
            .await
    }

    /// Flags the connection as failed so it is destroyed on return.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }
}

impl<C: Connector> Drop for Lease<C> {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };

        let pool = Arc::clone(&self.pool);
        let permit = self.permit.take();
        let broken = self.broken;

        tokio::spawn(async move {
            pool.release(slot, broken).await;
            // The permit frees capacity only once the return has completed.
            drop(permit);
        });
    }
}
