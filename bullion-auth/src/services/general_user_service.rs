use std::sync::Arc;

use metrics::counter;
use uuid::Uuid;
use validator::Validate;

use bullion_shared::errors::{AppError, AppResult, ErrorCode};
use bullion_shared::token::{CustomClaims, TokenService};
use bullion_shared::types::auth::{GeneralUserClaims, TokenKind, TokenPair};

use crate::models::{GeneralUser, GeneralUserEntity, GeneralUserPatch, GeneralUserReq};
use crate::repos::{BullionSiteInfoRepository, GeneralUserRepository};
use crate::services::credential::{generate_random_pass, CredentialVerifier};
use crate::services::profile_faker::ProfileSynthesizer;
use crate::services::ApprovalService;

/// Registration and authentication of general users against a bullion site.
pub struct GeneralUserService {
    users: Arc<dyn GeneralUserRepository>,
    sites: Arc<dyn BullionSiteInfoRepository>,
    approvals: Arc<ApprovalService>,
    tokens: Arc<TokenService>,
    credentials: Arc<dyn CredentialVerifier>,
    profiles: Arc<dyn ProfileSynthesizer>,
}

impl GeneralUserService {
    pub fn new(
        users: Arc<dyn GeneralUserRepository>,
        sites: Arc<dyn BullionSiteInfoRepository>,
        approvals: Arc<ApprovalService>,
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialVerifier>,
        profiles: Arc<dyn ProfileSynthesizer>,
    ) -> Self {
        Self { users, sites, approvals, tokens, credentials, profiles }
    }

    /// Register a user under `bullion_id` from a raw JSON payload.
    ///
    /// The returned entity carries the freshly generated credential in the
    /// clear; the stored copy carries whatever the credential verifier seals.
    pub async fn register_new(
        &self,
        bullion_id: Uuid,
        payload: serde_json::Value,
    ) -> AppResult<GeneralUserEntity> {
        let bullion = self
            .sites
            .find_one(bullion_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("bullion {bullion_id} not found")))?;

        let mut profile = if bullion.general_user_info.auto_login {
            self.profiles.synthesize()
        } else {
            GeneralUser::default()
        };
        profile.random_pass = generate_random_pass();

        parse_patch(payload)?.apply(&mut profile);
        profile.validate().map_err(|e| AppError::invalid_input(&e))?;

        let mut entity = GeneralUserEntity::new(profile);
        entity.base.create_new_id();
        entity.validate().map_err(|e| AppError::invalid_input(&e))?;

        let mut stored = entity.clone();
        stored.user.random_pass = self.credentials.seal(&entity.user.random_pass)?;
        let mut stored = self.users.save(&stored).await?;

        counter!("general_user_registered_total").increment(1);
        tracing::info!(
            user_id = %stored.id(),
            bullion_id = %bullion_id,
            is_auto = stored.user.is_auto,
            "general user registered"
        );

        if let Err(err) = self.approvals.send_approval_request(&stored, &bullion).await {
            // compensate: the user exists without an approval request
            tracing::warn!(user_id = %stored.id(), bullion_id = %bullion_id, error = %err, "approval request failed after registration");
            stored.user.registration_incomplete = true;
            stored.base.touch();
            if let Err(save_err) = self.users.save(&stored).await {
                tracing::error!(user_id = %stored.id(), error = %save_err, "failed to mark registration incomplete");
            }
            return Err(err);
        }

        Ok(entity)
    }

    pub async fn get_general_user_details_by_id_password(
        &self,
        id: Uuid,
        password: &str,
    ) -> AppResult<GeneralUserEntity> {
        let entity = self
            .users
            .find_one(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("general user {id} not found")))?;

        if !self.credentials.verify(password, &entity.user.random_pass)? {
            tracing::warn!(user_id = %id, "general user credential mismatch");
            return Err(AppError::new(
                ErrorCode::GeneralUserInvalidPassword,
                "general user credential does not match",
            ));
        }

        Ok(entity)
    }

    /// Explicit "send for approval" for an existing user. Also clears a
    /// previously failed registration's incomplete marker.
    pub async fn create_approval_request(
        &self,
        user_id: Uuid,
        password: &str,
        bullion_id: Uuid,
    ) -> AppResult<GeneralUserReq> {
        let mut user = self.get_general_user_details_by_id_password(user_id, password).await?;
        let bullion = self
            .sites
            .find_one(bullion_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("bullion {bullion_id} not found")))?;

        let req = self.approvals.send_approval_request(&user, &bullion).await?;

        if user.user.registration_incomplete {
            user.user.registration_incomplete = false;
            user.base.touch();
            // the request is stored; a failed marker update is only logged
            match self.users.save(&user).await {
                Ok(_) => tracing::info!(user_id = %user_id, "general user registration completed"),
                Err(err) => tracing::error!(
                    user_id = %user_id,
                    request_id = %req.id(),
                    error = %err,
                    "failed to clear registration incomplete marker"
                ),
            }
        }

        Ok(req)
    }

    /// Login: authenticate, then pass the approval gate.
    pub async fn validate_approval_and_generate_token(
        &self,
        user_id: Uuid,
        password: &str,
        bullion_id: Uuid,
    ) -> AppResult<TokenPair> {
        let user = self.get_general_user_details_by_id_password(user_id, password).await?;
        self.approvals
            .resolve_and_issue_tokens(user.id(), bullion_id, user.role)
            .await
    }

    /// Exchange a refresh token for a new pair. The approval gate runs again,
    /// so a request rejected after login stops refreshes too.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let verified: CustomClaims<GeneralUserClaims> = self.tokens.verify_token(refresh_token)?;
        if verified.claims.kind != TokenKind::Refresh {
            return Err(AppError::new(ErrorCode::TokenInvalid, "refresh token required"));
        }

        let user_id = verified.claims.user_id;
        let user = self
            .users
            .find_one(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("general user {user_id} not found")))?;

        self.approvals
            .resolve_and_issue_tokens(user.id(), verified.claims.bullion_id, user.role)
            .await
    }
}

fn parse_patch(payload: serde_json::Value) -> AppResult<GeneralUserPatch> {
    if !payload.is_object() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "general user payload must be a JSON object",
        ));
    }

    // decode key by key so a bad value is reported against its own field
    let mut violations = Vec::new();
    if let Some(obj) = payload.as_object() {
        for (key, value) in obj {
            let single = serde_json::Value::Object(std::iter::once((key.clone(), value.clone())).collect());
            if let Err(e) = serde_json::from_value::<GeneralUserPatch>(single) {
                violations.push(serde_json::json!({
                    "field": snake_case(key),
                    "code": "invalid_type",
                    "message": e.to_string(),
                }));
            }
        }
    }
    if !violations.is_empty() {
        return Err(AppError::with_details(
            ErrorCode::ValidationError,
            "validation failed",
            serde_json::Value::Array(violations),
        ));
    }

    serde_json::from_value(payload)
        .map_err(|e| AppError::internal(format!("general user payload did not decode: {e}")))
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
