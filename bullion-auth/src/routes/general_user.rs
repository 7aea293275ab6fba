use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use bullion_shared::errors::{AppError, AppResult, ErrorCode};
use bullion_shared::types::auth::TokenPair;
use bullion_shared::types::ApiResponse;

use crate::models::{GeneralUserEntity, GeneralUserReq};
use crate::AppState;

/// Registration takes the bullion id next to the profile fields in one object.
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<serde_json::Value>,
) -> AppResult<Json<ApiResponse<GeneralUserEntity>>> {
    let raw = payload
        .as_object_mut()
        .and_then(|obj| obj.remove("bullionId"))
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "bullionId is required"))?;
    let bullion_id = raw
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "bullionId is not a valid id"))?;

    let entity = state.general_users.register_new(bullion_id, payload).await?;
    Ok(Json(ApiResponse::ok(entity)))
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub id: Uuid,
    pub password: String,
}

pub async fn get_details(
    State(state): State<AppState>,
    Query(query): Query<DetailsQuery>,
) -> AppResult<Json<ApiResponse<GeneralUserEntity>>> {
    let entity = state
        .general_users
        .get_general_user_details_by_id_password(query.id, &query.password)
        .await?;
    Ok(Json(ApiResponse::ok(entity)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUserAuthRequest {
    pub user_id: Uuid,
    pub password: String,
    pub bullion_id: Uuid,
}

pub async fn send_for_approval(
    State(state): State<AppState>,
    Json(req): Json<GeneralUserAuthRequest>,
) -> AppResult<Json<ApiResponse<GeneralUserReq>>> {
    let approval = state
        .general_users
        .create_approval_request(req.user_id, &req.password, req.bullion_id)
        .await?;
    Ok(Json(ApiResponse::ok(approval)))
}

pub async fn get_token(
    State(state): State<AppState>,
    Json(req): Json<GeneralUserAuthRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let pair = state
        .general_users
        .validate_approval_and_generate_token(req.user_id, &req.password, req.bullion_id)
        .await?;
    Ok(Json(ApiResponse::ok(pair)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let pair = state.general_users.refresh_token(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(pair)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::models::{BullionSiteInfo, GeneralUserInfo};
    use crate::repos::BullionSiteInfoRepository;
    use crate::routes::router;
    use crate::routes::testing::{get, json_request, send, state};
    use crate::AppState;

    async fn site(state: &AppState, auto_approve: bool) -> BullionSiteInfo {
        let site = BullionSiteInfo::new(
            "Akshat Bullion",
            "akshat.example",
            "akshat",
            GeneralUserInfo { auto_approve, auto_login: false },
        );
        state.repos.bullion_site_infos.save(&site).await.unwrap()
    }

    fn registration(bullion_id: impl ToString) -> serde_json::Value {
        json!({
            "bullionId": bullion_id.to_string(),
            "firstName": "Asha",
            "lastName": "Mehta",
            "firmName": "Mehta Jewellers",
            "contactNumber": "9876543210",
            "gstNumber": "27ABCDE1234F1Z5",
            "os": "android 14",
            "deviceId": "device-1",
            "deviceType": "android",
        })
    }

    #[tokio::test]
    async fn register_login_and_refresh() {
        let state = state();
        let site = site(&state, true).await;
        let app = router(state);

        let (status, body) = send(&app, json_request("POST", "/auth/general-user/register", registration(site.id()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let user_id = body["data"]["id"].as_str().unwrap().to_string();
        let password = body["data"]["randomPass"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["role"], "GENERAL_USER");

        let uri = format!("/auth/general-user/get?id={user_id}&password={password}");
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["firstName"], "Asha");

        let login = json!({ "userId": user_id, "password": password, "bullionId": site.id() });
        let (status, body) = send(&app, json_request("POST", "/auth/general-user/get-general-user-token", login)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tokenType"], "Bearer");
        let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            json_request("POST", "/auth/general-user/refresh-token", json!({ "refreshToken": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["accessToken"].as_str().is_some());
    }

    #[tokio::test]
    async fn pending_login_is_forbidden() {
        let state = state();
        let site = site(&state, false).await;
        let app = router(state);

        let (_, body) = send(&app, json_request("POST", "/auth/general-user/register", registration(site.id()))).await;
        let login = json!({
            "userId": body["data"]["id"],
            "password": body["data"]["randomPass"],
            "bullionId": site.id(),
        });

        let (status, body) = send(&app, json_request("POST", "/auth/general-user/get-general-user-token", login.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["name"], "ERROR_GENERAL_USER_REQ_PENDING");

        let (status, body) = send(&app, json_request("POST", "/auth/general-user/send-for-approval", login)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "REQUEST ALREADY EXISTS");
    }

    #[tokio::test]
    async fn register_validation_envelope() {
        let state = state();
        let site = site(&state, false).await;
        let app = router(state);

        let mut payload = registration(site.id());
        payload["gstNumber"] = json!("not-a-gstin");
        let (status, body) = send(&app, json_request("POST", "/auth/general-user/register", payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["name"], "INVALID_INPUT");
        let extra = body["error"]["extra"].as_array().unwrap();
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0]["field"], "gst_number");

        let (status, body) = send(
            &app,
            json_request("POST", "/auth/general-user/register", json!({ "firstName": "Asha" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "bullionId is required");

        let mut payload = registration("not-a-uuid");
        let (status, body) = send(&app, json_request("POST", "/auth/general-user/register", payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "bullionId is not a valid id");

        payload["bullionId"] = json!(42);
        let (_, body) = send(&app, json_request("POST", "/auth/general-user/register", payload)).await;
        assert_eq!(body["error"]["message"], "bullionId is not a valid id");
    }

    #[tokio::test]
    async fn mistyped_field_names_the_field() {
        let state = state();
        let site = site(&state, false).await;
        let app = router(state);

        let mut payload = registration(site.id());
        payload["deviceType"] = json!("linux");
        let (status, body) = send(&app, json_request("POST", "/auth/general-user/register", payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["name"], "INVALID_INPUT");
        let extra = body["error"]["extra"].as_array().unwrap();
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0]["field"], "device_type");
        assert_eq!(extra[0]["code"], "invalid_type");

        let mut payload = registration(site.id());
        payload["firstName"] = json!("x".repeat(101));
        let (status, body) = send(&app, json_request("POST", "/auth/general-user/register", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["extra"][0]["field"], "first_name");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let state = state();
        let site = site(&state, true).await;
        let app = router(state);

        let (_, body) = send(&app, json_request("POST", "/auth/general-user/register", registration(site.id()))).await;
        let uri = format!("/auth/general-user/get?id={}&password=nope", body["data"]["id"].as_str().unwrap());

        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["name"], "ERROR_GENERAL_USER_INVALID_PASSWORD");
        assert!(!body["error"]["message"].as_str().unwrap().contains("nope"));
    }
}
