use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::errors::{AppError, ErrorCode};
use crate::token::{CustomClaims, TokenService};
use crate::types::auth::{AuthGeneralUser, GeneralUserClaims, TokenKind};

/// Resolves the calling general user from an `Authorization: Bearer` access token.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthGeneralUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let tokens = Arc::<TokenService>::from_ref(state);

        let verified: CustomClaims<GeneralUserClaims> = tokens.verify_token(&token)?;
        if verified.claims.kind != TokenKind::Access {
            return Err(AppError::new(ErrorCode::TokenInvalid, "access token required"));
        }

        Ok(AuthGeneralUser::from(verified.claims))
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "authorization header must use Bearer scheme"))
}
