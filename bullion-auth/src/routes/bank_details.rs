use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use bullion_shared::errors::{AppError, AppResult, ErrorCode};
use bullion_shared::types::auth::AuthGeneralUser;
use bullion_shared::types::ApiResponse;

use crate::models::BankDetails;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailsQuery {
    pub bullion_id: Option<String>,
}

/// Bank accounts of the caller's own bullion site.
pub async fn get_bank_details(
    user: AuthGeneralUser,
    State(state): State<AppState>,
    Query(query): Query<BankDetailsQuery>,
) -> AppResult<Json<ApiResponse<Vec<BankDetails>>>> {
    let bullion_id = query
        .bullion_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "bullionId is required"))?;
    let bullion_id = Uuid::parse_str(&bullion_id)
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "bullionId is not a valid id"))?;

    if bullion_id != user.bullion_id {
        tracing::warn!(user_id = %user.id, bullion_id = %bullion_id, "bullion id does not match token");
        return Err(AppError::forbidden("bullion id does not match token"));
    }

    let details = state.repos.bank_details.find_by_bullion_id(bullion_id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use bullion_shared::types::auth::{GeneralUserClaims, TokenKind, UserRole};

    use super::*;
    use crate::models::BaseEntity;
    use crate::repos::BankDetailsRepository;
    use crate::routes::router;
    use crate::routes::testing::{get, send, state};

    fn authed(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn bank_details_scoped_to_token_bullion() {
        let state = state();
        let bullion_id = Uuid::new_v4();
        let account = BankDetails {
            base: BaseEntity::new(),
            bullion_id,
            account_holder_name: "Akshat Bullion".into(),
            account_number: "001234567890".into(),
            ifsc_code: "HDFC0000123".into(),
            bank_name: "HDFC Bank".into(),
            branch_name: "Zaveri Bazaar".into(),
        };
        state.repos.bank_details.save(&account).await.unwrap();

        let claims = GeneralUserClaims::new(Uuid::new_v4(), bullion_id, UserRole::GeneralUser, TokenKind::Access);
        let pair = state.tokens.generate_token_pair(&claims, 60, 600).unwrap();
        let app = router(state);

        let (status, body) = send(&app, authed(&format!("/data/bank-details?bullionId={bullion_id}"), &pair.access_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["ifscCode"], "HDFC0000123");

        let other = Uuid::new_v4();
        let (status, _) = send(&app, authed(&format!("/data/bank-details?bullionId={other}"), &pair.access_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, authed("/data/bank-details", &pair.access_token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["name"], "INVALID_INPUT");

        // refresh tokens do not authenticate data calls
        let (status, _) = send(&app, authed(&format!("/data/bank-details?bullionId={bullion_id}"), &pair.refresh_token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, get(&format!("/data/bank-details?bullionId={bullion_id}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
