use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions as _, Connection as _};

use pool::{Connection, Connector, PoolError, PoolOptions, PoolRegistry};

use crate::error::Result;
use crate::settings::FacadeSettings;

/// Opens a single unpooled MySQL connection from an opaque URL.
pub async fn connect(url: &str) -> Result<MySqlConnection> {
    let conn = MySqlConnection::connect(url).await?;
    Ok(conn)
}

/// Opens physical MySQL connections for the pool layer.
pub struct MySqlConnector;

/// One pooled physical MySQL connection.
///
/// Flags itself broken when the driver reports an error, so the pool
/// destroys it on return instead of handing it to the next caller.
pub struct PooledMySql {
    inner: Option<MySqlConnection>,
    broken: bool,
}

impl PooledMySql {
    /// The live sqlx connection, or `None` once the slot was torn down.
    pub fn connection(&mut self) -> Option<&mut MySqlConnection> {
        self.inner.as_mut()
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Conn = PooledMySql;

    async fn connect(&self, options: &PoolOptions) -> pool::Result<PooledMySql> {
        let mut opts = MySqlConnectOptions::new().host(&options.host);
        if let Some(port) = options.port {
            opts = opts.port(port);
        }
        if let Some(username) = &options.username {
            opts = opts.username(username);
        }
        if let Some(password) = &options.password {
            opts = opts.password(password);
        }
        if let Some(database) = &options.database {
            opts = opts.database(database);
        }

        let inner = opts
            .connect()
            .await
            .map_err(|e| PoolError::Backend(e.to_string()))?;

        Ok(PooledMySql {
            inner: Some(inner),
            broken: false,
        })
    }
}

#[async_trait]
impl Connection for PooledMySql {
    async fn ping(&mut self) -> pool::Result<()> {
        let Some(conn) = self.inner.as_mut() else {
            return Err(PoolError::Backend("connection already closed".to_string()));
        };

        if let Err(e) = conn.ping().await {
            self.broken = true;
            return Err(PoolError::Backend(e.to_string()));
        }
        Ok(())
    }

    fn is_broken(&self) -> bool {
        self.broken
    }

    async fn close(&mut self) -> pool::Result<()> {
        if let Some(conn) = self.inner.take() {
            conn.close()
                .await
                .map_err(|e| PoolError::Backend(e.to_string()))?;
        }
        Ok(())
    }
}

/// Registry of MySQL pools keyed by configuration.
pub type MySqlRegistry = PoolRegistry<MySqlConnector>;

/// Builds the MySQL pool registry handed to request handlers at startup.
pub fn registry(settings: &FacadeSettings) -> MySqlRegistry {
    PoolRegistry::with_probe_interval(MySqlConnector, settings.probe_interval())
}
