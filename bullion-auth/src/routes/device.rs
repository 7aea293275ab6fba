use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use bullion_shared::types::ApiResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdResponse {
    pub device_id: String,
}

/// Hands out a fresh device id for clients that have none yet.
pub async fn generate_device_id() -> Json<ApiResponse<DeviceIdResponse>> {
    Json(ApiResponse::ok(DeviceIdResponse {
        device_id: Uuid::new_v4().to_string(),
    }))
}
