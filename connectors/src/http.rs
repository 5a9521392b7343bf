use std::time::Duration;

use crate::error::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A `reqwest` client preconfigured for handler use.
pub fn client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}
