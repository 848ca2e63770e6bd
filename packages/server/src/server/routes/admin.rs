//! Read-only listings across every member, for operators.

use axum::{extract::Extension, Json};

use crate::domains::lifecycle::{ChatDetails, OwnedNeed, OwnedOffer};
use crate::domains::matching::EnrichedMatch;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

pub async fn admin_needs(Extension(state): Extension<AppState>) -> ApiResult<Vec<OwnedNeed>> {
    Ok(Json(state.coordinator.all_needs().await?))
}

pub async fn admin_offers(Extension(state): Extension<AppState>) -> ApiResult<Vec<OwnedOffer>> {
    Ok(Json(state.coordinator.all_offers().await?))
}

pub async fn admin_matches(Extension(state): Extension<AppState>) -> ApiResult<Vec<EnrichedMatch>> {
    Ok(Json(state.coordinator.all_matches().await?))
}

pub async fn admin_chats(Extension(state): Extension<AppState>) -> ApiResult<Vec<ChatDetails>> {
    Ok(Json(state.coordinator.all_chats().await?))
}
