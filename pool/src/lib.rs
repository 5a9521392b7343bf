//! Keyed connection-pool cache with per-connection health maintenance.
//!
//! A [`PoolRegistry`] maps connection configurations to shared
//! [`ConnectionPool`]s: structurally equal configurations always resolve to
//! the same pool. Every physical connection a pool opens carries its own
//! recurring liveness probe, and a connection that reports an error is
//! destroyed individually without disturbing the rest of the pool.

pub mod connection;
pub mod error;
pub mod options;
pub mod pool;
pub mod registry;

mod probe;

pub use connection::{Connection, Connector};
pub use error::{PoolError, Result};
pub use options::{PoolOptions, PoolTarget, DEFAULT_CONNECTION_LIMIT};
pub use pool::{ConnectionPool, Lease};
pub use probe::DEFAULT_PROBE_INTERVAL;
pub use registry::PoolRegistry;
