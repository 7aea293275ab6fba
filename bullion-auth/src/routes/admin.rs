use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use bullion_shared::errors::{AppError, AppResult};
use bullion_shared::types::ApiResponse;

use crate::models::{BullionSiteInfo, GeneralUserAuthStatus, GeneralUserReq};
use crate::AppState;

const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Debug, Deserialize)]
pub struct ShortNameQuery {
    pub name: String,
}

pub async fn bullion_details_by_short_name(
    State(state): State<AppState>,
    Query(query): Query<ShortNameQuery>,
) -> AppResult<Json<ApiResponse<BullionSiteInfo>>> {
    let site = state
        .repos
        .bullion_site_infos
        .find_by_short_name(&query.name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("bullion with short name {} not found", query.name)))?;
    Ok(Json(ApiResponse::ok(site)))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Uuid,
}

pub async fn bullion_details_by_id(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<BullionSiteInfo>>> {
    let site = state
        .repos
        .bullion_site_infos
        .find_one(query.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("bullion {} not found", query.id)))?;
    Ok(Json(ApiResponse::ok(site)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: GeneralUserAuthStatus,
}

/// Admin decision on a general user's approval request.
pub async fn update_general_user_req(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<GeneralUserReq>>> {
    let presented = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing admin key"))?;
    if presented != state.config.admin_api_key {
        return Err(AppError::forbidden("invalid admin key"));
    }

    let updated = state.approvals.update_status(id, req.status).await?;
    Ok(Json(ApiResponse::ok(updated)))
}
