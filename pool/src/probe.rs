use std::sync::Weak;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::connection::Connection;

/// How often each physical connection is probed when a pool does not
/// override the interval.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Cancellation handle for one connection's recurring liveness probe.
///
/// The task holds only a weak reference to the connection slot, so it never
/// keeps a discarded connection alive; dropping the handle aborts the task.
pub(crate) struct ProbeHandle {
    task: JoinHandle<()>,
}

impl ProbeHandle {
    pub(crate) fn spawn<C: Connection>(conn: Weak<Mutex<C>>, interval: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so probing
            // starts one full interval after the connection opens.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(conn) = conn.upgrade() else {
                    break;
                };

                // Skip the probe while a caller is mid-query on this
                // connection; the outcome is informational either way.
                if let Ok(mut conn) = conn.try_lock() {
                    let _ = conn.ping().await;
                };
            }
        });

        Self { task }
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
