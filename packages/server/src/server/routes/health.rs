use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use std::time::Duration;

use crate::server::app::AppState;

const STORE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: StoreHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Liveness plus a store round-trip.
///
/// 200 when the store answers within the probe timeout, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = state.coordinator.deps().store.stats();

    let store = match tokio::time::timeout(STORE_PROBE_TIMEOUT, probe).await {
        Ok(Ok(_)) => StoreHealth {
            status: "ok",
            error: None,
        },
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health probe failed");
            StoreHealth {
                status: "error",
                error: Some(format!("store query failed: {}", e)),
            }
        }
        Err(_) => StoreHealth {
            status: "error",
            error: Some(format!("store did not answer within {:?}", STORE_PROBE_TIMEOUT)),
        },
    };

    let (code, status) = if store.error.is_none() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (code, Json(HealthResponse { status, store }))
}
