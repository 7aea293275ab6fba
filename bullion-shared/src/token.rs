//! Signed bearer tokens.
//!
//! Tokens are compact HS256 JWS strings carrying an application payload under
//! `claims` next to the registered `iss`/`sub`/`iat`/`exp` claims. The signing
//! key is fixed when the [`TokenService`] is built and never changes afterwards.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{GeneralUserClaims, TokenKind, TokenPair};

/// HMAC algorithms accepted at verification time.
const HMAC_FAMILY: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomClaims<T> {
    pub claims: T,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl<T> CustomClaims<T> {
    pub fn new(claims: T, issuer: impl Into<String>, subject: impl Into<String>, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            claims,
            iss: issuer.into(),
            sub: subject.into(),
            iat: now,
            exp: now + ttl_secs,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("unexpected signing method")]
    InvalidSignatureMethod,

    #[error("invalid token")]
    InvalidToken,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                TokenError::InvalidSignatureMethod
            }
            _ => TokenError::InvalidToken,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        let code = match &err {
            TokenError::Expired => ErrorCode::TokenExpired,
            TokenError::InvalidSignature => ErrorCode::InvalidSignature,
            TokenError::InvalidSignatureMethod => ErrorCode::InvalidSignatureMethod,
            TokenError::InvalidToken => ErrorCode::TokenInvalid,
            TokenError::Encoding(_) => ErrorCode::InternalError,
        };
        AppError::new(code, err.to_string())
    }
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(signing_key: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            issuer: issuer.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn generate_token<T: Serialize>(&self, claims: &CustomClaims<T>) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature, algorithm family, issuer and expiry, returning the claims.
    pub fn verify_token<T: DeserializeOwned>(&self, token: &str) -> Result<CustomClaims<T>, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_FAMILY.to_vec();
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<CustomClaims<T>>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Issue an access and a refresh token for the same general user.
    pub fn generate_token_pair(
        &self,
        claims: &GeneralUserClaims,
        access_ttl: i64,
        refresh_ttl: i64,
    ) -> Result<TokenPair, TokenError> {
        let subject = claims.user_id.to_string();

        let access = CustomClaims::new(claims.with_kind(TokenKind::Access), &self.issuer, &subject, access_ttl);
        let refresh = CustomClaims::new(claims.with_kind(TokenKind::Refresh), &self.issuer, &subject, refresh_ttl);

        Ok(TokenPair::new(
            self.generate_token(&access)?,
            self.generate_token(&refresh)?,
            access_ttl,
        ))
    }
}
