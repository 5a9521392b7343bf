use async_trait::async_trait;

use crate::error::Result;
use crate::options::PoolOptions;

/// Opens physical connections to one backend.
///
/// A pool holds a single connector and calls it whenever demand outgrows the
/// idle set, up to the configured connection limit.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    async fn connect(&self, options: &PoolOptions) -> Result<Self::Conn>;
}

/// A single physical connection owned by a pool.
#[async_trait]
pub trait Connection: Send + 'static {
    /// No-op liveness probe.
    async fn ping(&mut self) -> Result<()>;

    /// Whether the connection has reported an unrecoverable error.
    ///
    /// A broken connection is destroyed on return instead of rejoining the
    /// idle set; the rest of the pool is untouched.
    fn is_broken(&self) -> bool {
        false
    }

    /// Tears the connection down. Dropping must also release the underlying
    /// resources; this hook exists for backends that want a clean goodbye.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
