use mongodb::{Client, Database};

pub use mongodb::bson::{self, doc, oid::ObjectId, Bson, DateTime, Document};

use crate::error::{FacadeError, Result};

const URL_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];

/// Checks the scheme prefix without touching the network.
pub fn validate_url(url: &str) -> Result<()> {
    if URL_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Ok(());
    }
    Err(FacadeError::Config(format!("invalid mongodb url '{}'", url)))
}

/// Builds a MongoDB client, failing fast on a malformed URL before any I/O
/// is attempted. The driver itself connects lazily.
pub async fn connect(url: &str) -> Result<Client> {
    validate_url(url)?;
    let client = Client::with_uri_str(url).await?;
    Ok(client)
}

/// The common connect-then-select-database path.
pub async fn database(url: &str, name: &str) -> Result<Database> {
    let client = connect(url).await?;
    Ok(client.database(name))
}
