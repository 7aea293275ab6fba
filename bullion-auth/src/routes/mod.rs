use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bullion_shared::middleware::metrics_middleware;

use crate::AppState;

pub mod admin;
pub mod bank_details;
pub mod device;
pub mod general_user;
pub mod health;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/auth/deviceId", get(device::generate_device_id))
        .route("/auth/general-user/register", post(general_user::register))
        .route("/auth/general-user/get", get(general_user::get_details))
        .route("/auth/general-user/send-for-approval", post(general_user::send_for_approval))
        .route("/auth/general-user/get-general-user-token", post(general_user::get_token))
        .route("/auth/general-user/refresh-token", post(general_user::refresh_token))
        .route("/auth/admin/bullion-details-by-short-name", get(admin::bullion_details_by_short_name))
        .route("/auth/admin/bullion-details-by-id", get(admin::bullion_details_by_id))
        .route("/auth/admin/general-user-req/:id", patch(admin::update_general_user_req))
        .route("/data/bank-details", get(bank_details::get_bank_details))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::repos::Repositories;
    use crate::AppState;

    pub const ADMIN_KEY: &str = "test-admin-key";

    pub fn state() -> AppState {
        let config = AppConfig {
            admin_api_key: ADMIN_KEY.into(),
            ..AppConfig::default()
        };
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState::new(config, Repositories::in_memory(), handle)
    }

    pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }
}
