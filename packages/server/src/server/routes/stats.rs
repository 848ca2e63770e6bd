use axum::{extract::Extension, Json};

use crate::kernel::DashboardStats;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

pub async fn dashboard_stats(Extension(state): Extension<AppState>) -> ApiResult<DashboardStats> {
    Ok(Json(state.coordinator.dashboard_stats().await?))
}
