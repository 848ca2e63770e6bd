use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::MemberId;
use crate::domains::member::{Member, NewMember, ProfileUpdate};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

/// Profile edit, made by the member themselves
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub actor_id: MemberId,
    #[serde(flatten)]
    pub update: ProfileUpdate,
}

pub async fn create_member(
    Extension(state): Extension<AppState>,
    Json(new_member): Json<NewMember>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let member = state.coordinator.register_member(new_member).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn list_members(Extension(state): Extension<AppState>) -> ApiResult<Vec<Member>> {
    Ok(Json(state.coordinator.list_members().await?))
}

pub async fn get_member(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<Member> {
    Ok(Json(state.coordinator.get_member(member_id).await?))
}

pub async fn update_profile(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<MemberId>,
    Json(body): Json<ProfileUpdateRequest>,
) -> ApiResult<Member> {
    Ok(Json(
        state
            .coordinator
            .update_profile(member_id, body.actor_id, body.update)
            .await?,
    ))
}
