use argon2::password_hash::{Error as PasswordHashError, SaltString};
use argon2::{Argon2, PasswordHasher};
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::thread_rng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HS256 key pair for session tokens, derived from one shared secret.
#[derive(Clone)]
pub struct SessionKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret.as_bytes()),
            dec: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Claims carried by both access and refresh tokens. `jti` ties refresh
/// tokens to their stored rotation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
}

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

pub fn new_jti() -> String {
    let mut bytes = [0u8; 16];
    thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Issue a signed session token for `user_id` valid for `ttl_secs`.
pub fn issue(
    keys: &SessionKeys,
    user_id: Uuid,
    role: &str,
    ttl_secs: i64,
) -> Result<(String, Claims), AuthError> {
    let iat = now_ts();
    let claims = Claims {
        sub: user_id,
        role: role.into(),
        iat,
        exp: iat + ttl_secs,
        jti: new_jti(),
    };
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.enc)
        .map_err(|_| AuthError::InvalidToken)?;
    Ok((token, claims))
}

/// Resolve a session token back to its claims, rejecting expired or
/// tampered tokens.
pub fn resolve(keys: &SessionKeys, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    jsonwebtoken::decode::<Claims>(token, &keys.dec, &validation)
        .map(|d| d.claims)
        .map_err(|_| AuthError::InvalidToken)
}

pub fn hash_password(raw: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(raw.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

pub fn verify_password(raw: &str, hash: &str) -> bool {
    use argon2::{PasswordHash, PasswordVerifier};
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

/// Fingerprint used to store refresh tokens without keeping the token itself.
pub fn sha256_hex(s: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("supersecret").unwrap();
        assert!(verify_password("supersecret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("supersecret", "not-a-phc-string"));
    }

    #[test]
    fn issued_token_resolves_to_same_claims() {
        let keys = SessionKeys::from_secret("test_secret_key");
        let user = Uuid::new_v4();
        let (token, claims) = issue(&keys, user, "patient", 3600).unwrap();
        let resolved = resolve(&keys, &token).unwrap();
        assert_eq!(resolved.sub, user);
        assert_eq!(resolved.role, "patient");
        assert_eq!(resolved.jti, claims.jti);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let keys = SessionKeys::from_secret("secret_a");
        let other = SessionKeys::from_secret("secret_b");
        let (token, _) = issue(&keys, Uuid::new_v4(), "doctor", 3600).unwrap();
        assert!(resolve(&other, &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = SessionKeys::from_secret("test_secret_key");
        // Past the default validation leeway.
        let (token, _) = issue(&keys, Uuid::new_v4(), "doctor", -120).unwrap();
        assert!(resolve(&keys, &token).is_err());
    }

    #[test]
    fn jtis_are_unique() {
        assert_ne!(new_jti(), new_jti());
    }
}
