use axum::{extract::Extension, Json};

use crate::domains::lifecycle::CheckInOutcome;
use crate::domains::matching::CheckIn;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

pub async fn submit_check_in(
    Extension(state): Extension<AppState>,
    Json(check_in): Json<CheckIn>,
) -> ApiResult<CheckInOutcome> {
    Ok(Json(state.coordinator.submit_check_in(check_in).await?))
}
