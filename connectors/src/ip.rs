use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{FacadeError, Result};

/// Whether `addr` falls inside any of `ranges`.
///
/// Ranges are CIDR blocks (`10.0.0.0/8`) or single addresses.
pub fn in_range(addr: &str, ranges: &[&str]) -> Result<bool> {
    let addr: IpAddr = addr
        .parse()
        .map_err(|_| FacadeError::Config(format!("invalid ip address '{}'", addr)))?;

    for range in ranges {
        if contains(range, &addr)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn contains(range: &str, addr: &IpAddr) -> Result<bool> {
    if let Ok(net) = range.parse::<IpNet>() {
        return Ok(net.contains(addr));
    }
    if let Ok(single) = range.parse::<IpAddr>() {
        return Ok(single == *addr);
    }
    Err(FacadeError::Config(format!("invalid ip range '{}'", range)))
}
