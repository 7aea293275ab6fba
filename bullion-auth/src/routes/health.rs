use axum::extract::State;
use axum::Json;

use bullion_shared::types::HealthResponse;

use crate::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("bullion-auth", env!("CARGO_PKG_VERSION")))
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}
