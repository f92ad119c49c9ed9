use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::ServiceError, AppState};

/// Cookie that carries a customer session token.
pub const USER_COOKIE: &str = "token";
/// Cookie that carries the seller session token.
pub const SELLER_COOKIE: &str = "seller_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Seller,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and validates the JWTs used for cookie sessions, and hashes
/// account passwords with argon2.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(jwt_secret: &str, expiration_secs: i64, secure_cookies: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            expiration_secs,
            secure_cookies,
        }
    }

    pub fn issue_user_token(&self, user_id: Uuid) -> Result<String, ServiceError> {
        self.issue(user_id.to_string(), Role::User)
    }

    pub fn issue_seller_token(&self, email: &str) -> Result<String, ServiceError> {
        self.issue(email.to_string(), Role::Seller)
    }

    fn issue(&self, sub: String, role: Role) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            role,
            exp: now + self.expiration_secs,
            iat: now,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {}", e)))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Unauthorized("Invalid or expired session".to_string()))
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ServiceError::InternalError(format!("failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ServiceError::InternalError(format!("stored hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Builds a Set-Cookie value that installs a session token.
    pub fn session_cookie(&self, name: &str, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            name, token, self.expiration_secs
        );
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Builds a Set-Cookie value that removes a session cookie.
    pub fn clear_cookie(&self, name: &str) -> String {
        let mut cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name);
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    let header = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        let mut split = pair.trim().splitn(2, '=');
        if split.next() == Some(name) {
            return split.next().map(|v| v.to_string());
        }
    }
    None
}

/// A customer session extracted from the `token` cookie.
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = cookie_value(parts, USER_COOKIE)
            .ok_or_else(|| ServiceError::Unauthorized("Not authorized".to_string()))?;
        let claims = state.auth.decode_token(&token)?;
        if claims.role != Role::User {
            return Err(ServiceError::Unauthorized("Not authorized".to_string()));
        }
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Not authorized".to_string()))?;
        Ok(AuthenticatedUser { user_id })
    }
}

/// A seller session extracted from the `seller_token` cookie.
pub struct AuthenticatedSeller {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedSeller
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = cookie_value(parts, SELLER_COOKIE)
            .ok_or_else(|| ServiceError::Unauthorized("Not authorized".to_string()))?;
        let claims = state.auth.decode_token(&token)?;
        if claims.role != Role::Seller {
            return Err(ServiceError::Unauthorized("Not authorized".to_string()));
        }
        Ok(AuthenticatedSeller { email: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("unit-test-secret-with-plenty-of-length", 3600, false)
    }

    #[test]
    fn user_token_round_trips() {
        let auth = service();
        let user_id = Uuid::new_v4();
        let token = auth.issue_user_token(user_id).unwrap();
        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn seller_token_carries_seller_role() {
        let auth = service();
        let token = auth.issue_seller_token("seller@example.com").unwrap();
        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.role, Role::Seller);
        assert_eq!(claims.sub, "seller@example.com");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service();
        let other = AuthService::new("a-completely-different-signing-secret!!", 3600, false);
        let token = other.issue_user_token(Uuid::new_v4()).unwrap();
        assert!(auth.decode_token(&token).is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let auth = service();
        let hash = auth.hash_password("hunter2hunter2").unwrap();
        assert!(auth.verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!auth.verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn session_cookie_sets_flags() {
        let auth = AuthService::new("unit-test-secret-with-plenty-of-length", 60, true);
        let cookie = auth.session_cookie(USER_COOKIE, "abc");
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cookie.contains("Secure"));

        let cleared = auth.clear_cookie(USER_COOKIE);
        assert!(cleared.contains("Max-Age=0"));
    }
}
