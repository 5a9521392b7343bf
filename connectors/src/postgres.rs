use sqlx::postgres::PgConnection;
use sqlx::Connection as _;

use crate::error::Result;

/// Opens a single PostgreSQL connection from an opaque connection string.
pub async fn connect(url: &str) -> Result<PgConnection> {
    let conn = PgConnection::connect(url).await?;
    Ok(conn)
}
