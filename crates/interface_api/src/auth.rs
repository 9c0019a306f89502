//! Token issuance and validation
//!
//! Two token kinds share one signing secret: short-lived access tokens
//! carried on every request, and longer-lived refresh tokens accepted only
//! by the refresh endpoint. The `token_type` claim keeps them apart, so a
//! refresh token can never authorize an API call.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::{CallerIdentity, Role, UserId};
use domain_identity::User;

/// Distinguishes access from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User's role
    pub role: String,
    /// Access or refresh
    pub token_type: TokenType,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Wrong token type for this operation")]
    WrongTokenType,
}

/// The pair returned by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Issues an access/refresh token pair for a user
pub fn issue_token_pair(
    user: &User,
    secret: &str,
    access_secs: u64,
    refresh_secs: u64,
) -> Result<TokenPair, AuthError> {
    let access_token = create_token(user, TokenType::Access, secret, access_secs)?;
    let refresh_token = create_token(user, TokenType::Refresh, secret, refresh_secs)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: access_secs,
    })
}

/// Creates a signed JWT of the given type
pub fn create_token(
    user: &User,
    token_type: TokenType,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = AccessClaims {
        sub: user.id.as_uuid().to_string(),
        role: user.role.as_str().to_string(),
        token_type,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT and checks it is of the expected type
pub fn validate_token(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<AccessClaims, AuthError> {
    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.token_type != expected {
        return Err(AuthError::WrongTokenType);
    }

    Ok(token_data.claims)
}

/// Reconstructs the caller identity from verified claims
pub fn caller_from_claims(claims: &AccessClaims) -> Result<CallerIdentity, AuthError> {
    let uuid = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let role = Role::parse(&claims.role).ok_or(AuthError::InvalidToken)?;
    Ok(CallerIdentity::new(UserId::from(uuid), role))
}
