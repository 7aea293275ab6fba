use std::sync::Arc;

use metrics::counter;
use uuid::Uuid;

use bullion_shared::errors::{AppError, AppResult, ErrorCode};
use bullion_shared::token::TokenService;
use bullion_shared::types::auth::{GeneralUserClaims, TokenKind, TokenPair, UserRole};

use crate::models::{BullionSiteInfo, GeneralUserAuthStatus, GeneralUserEntity, GeneralUserReq};
use crate::repos::GeneralUserReqRepository;

/// Owns the lifecycle of general-user approval requests and the gate that
/// turns an authorized request into tokens.
pub struct ApprovalService {
    reqs: Arc<dyn GeneralUserReqRepository>,
    tokens: Arc<TokenService>,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl ApprovalService {
    pub fn new(
        reqs: Arc<dyn GeneralUserReqRepository>,
        tokens: Arc<TokenService>,
        access_ttl: i64,
        refresh_ttl: i64,
    ) -> Self {
        Self { reqs, tokens, access_ttl, refresh_ttl }
    }

    /// Create the approval request for `(user, bullion)`.
    ///
    /// Every caller goes through here, so there is exactly one place deciding
    /// whether the pair already has a request. A site with auto-approve set
    /// gets an `AUTHORIZED` request straight away.
    pub async fn send_approval_request(
        &self,
        user: &GeneralUserEntity,
        bullion: &BullionSiteInfo,
    ) -> AppResult<GeneralUserReq> {
        let existing = self
            .reqs
            .find_one_by_general_user_id_and_bullion_id(user.id(), bullion.id())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %user.id(), bullion_id = %bullion.id(), "approval request lookup failed");
                AppError::internal(format!("approval request lookup failed: {e}"))
            })?;

        if existing.is_some() {
            return Err(AppError::new(ErrorCode::GeneralUserReqExists, "REQUEST ALREADY EXISTS"));
        }

        let status = if bullion.general_user_info.auto_approve {
            GeneralUserAuthStatus::Authorized
        } else {
            GeneralUserAuthStatus::Requested
        };

        // the store rejects a concurrent insert for the same pair
        let saved = self
            .reqs
            .insert(&GeneralUserReq::new(user.id(), bullion.id(), status))
            .await?;

        counter!("approval_requests_total", "status" => saved.status.to_string()).increment(1);
        tracing::info!(
            request_id = %saved.id(),
            user_id = %user.id(),
            bullion_id = %bullion.id(),
            status = %saved.status,
            "approval request created"
        );

        Ok(saved)
    }

    /// Issue a token pair if and only if the pair's request is authorized.
    pub async fn resolve_and_issue_tokens(
        &self,
        user_id: Uuid,
        bullion_id: Uuid,
        role: UserRole,
    ) -> AppResult<TokenPair> {
        let req = self
            .reqs
            .find_one_by_general_user_id_and_bullion_id(user_id, bullion_id)
            .await?
            .ok_or_else(|| AppError::not_found("approval request not found"))?;

        match req.status {
            GeneralUserAuthStatus::Requested => Err(AppError::new(
                ErrorCode::ApprovalPending,
                "approval request is pending",
            )),
            GeneralUserAuthStatus::Rejected => Err(AppError::new(
                ErrorCode::ApprovalRejected,
                "approval request was rejected",
            )),
            GeneralUserAuthStatus::Authorized => {
                let claims = GeneralUserClaims::new(user_id, bullion_id, role, TokenKind::Access);
                let pair = self
                    .tokens
                    .generate_token_pair(&claims, self.access_ttl, self.refresh_ttl)?;

                counter!("tokens_issued_total").increment(1);
                tracing::info!(user_id = %user_id, bullion_id = %bullion_id, "general user tokens issued");
                Ok(pair)
            }
            GeneralUserAuthStatus::Unknown(ref status) => {
                tracing::error!(request_id = %req.id(), status = %status, "approval request in unknown status");
                Err(AppError::new(
                    ErrorCode::InvalidApprovalStatus,
                    format!("approval request has invalid status {status}"),
                ))
            }
        }
    }

    /// Admin decision on a pending request.
    pub async fn update_status(
        &self,
        request_id: Uuid,
        status: GeneralUserAuthStatus,
    ) -> AppResult<GeneralUserReq> {
        let mut req = self
            .reqs
            .find_one(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("approval request not found"))?;

        if !req.status.can_transition_to(&status) {
            return Err(AppError::new(
                ErrorCode::InvalidStatusTransition,
                format!("cannot move approval request from {} to {}", req.status, status),
            ));
        }

        let previous = std::mem::replace(&mut req.status, status);
        req.base.touch();
        let saved = self.reqs.save(&req).await?;

        tracing::info!(
            request_id = %saved.id(),
            from = %previous,
            to = %saved.status,
            "approval request status updated"
        );
        Ok(saved)
    }
}

#[cfg(test)]
impl ApprovalService {
    pub async fn find_request(&self, user_id: Uuid, bullion_id: Uuid) -> AppResult<Option<GeneralUserReq>> {
        self.reqs
            .find_one_by_general_user_id_and_bullion_id(user_id, bullion_id)
            .await
    }
}
