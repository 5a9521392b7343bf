use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{FacadeError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Hashes a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String> {
    let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    Ok(hashed)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool> {
    let ok = bcrypt::verify(password, hashed)?;
    Ok(ok)
}

/// HMAC-SHA256 over the payload, base64 url-safe encoded.
pub fn sign(payload: &[u8], secret: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| FacadeError::Config("invalid hmac secret".to_string()))?;
    mac.update(payload);
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

pub fn verify_signature(payload: &[u8], secret: &[u8], signature: &str) -> Result<bool> {
    let decoded = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| FacadeError::Config("signature is not valid base64".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| FacadeError::Config("invalid hmac secret".to_string()))?;
    mac.update(payload);
    Ok(mac.verify_slice(&decoded).is_ok())
}
