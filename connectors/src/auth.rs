use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Issues an HS256 token for the subject, expiring after `expiry_hours`.
pub fn issue(subject: &str, secret: &str, expiry_hours: u64) -> Result<String> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: subject.to_string(),
        exp: now + expiry_hours as usize * 3600,
        iat: now,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-for-unit-tests-only";

    #[test]
    fn issue_and_verify_roundtrip() {
        let token = issue("user-123", TEST_SECRET, 24).expect("issue token");
        assert!(!token.is_empty());

        let claims = verify(&token, TEST_SECRET).expect("verify token");
        assert_eq!(claims.sub, "user-123");
    }

    #[test]
    fn rejects_the_wrong_secret() {
        let token = issue("user-123", TEST_SECRET, 24).expect("issue token");
        assert!(verify(&token, "wrong-secret").is_err());
    }

    #[test]
    fn rejects_a_malformed_token() {
        assert!(verify("not.a.valid.jwt", TEST_SECRET).is_err());
        assert!(verify("", TEST_SECRET).is_err());
    }

    #[test]
    fn expiry_lands_where_expected() {
        let before = Utc::now().timestamp() as usize;
        let token = issue("u1", TEST_SECRET, 2).expect("issue token");
        let after = Utc::now().timestamp() as usize;

        let claims = verify(&token, TEST_SECRET).expect("verify token");
        assert!(claims.exp >= before + 2 * 3600);
        assert!(claims.exp <= after + 2 * 3600);
    }
}
