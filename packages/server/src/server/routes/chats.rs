use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::matches::ActorRequest;
use crate::common::{ChatId, MemberId, SlotId};
use crate::domains::lifecycle::ChatDetails;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ProposeSlotsRequest {
    pub actor_id: MemberId,
    /// RFC 3339 timestamps
    pub slots: Vec<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SelectSlotRequest {
    pub actor_id: MemberId,
    pub slot_id: SlotId,
}

pub async fn member_chats(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<Vec<ChatDetails>> {
    Ok(Json(state.coordinator.chats_for_member(member_id).await?))
}

pub async fn propose_slots(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<ChatId>,
    Json(body): Json<ProposeSlotsRequest>,
) -> ApiResult<ChatDetails> {
    Ok(Json(
        state
            .coordinator
            .propose_slots(chat_id, body.actor_id, body.slots)
            .await?,
    ))
}

pub async fn select_slot(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<ChatId>,
    Json(body): Json<SelectSlotRequest>,
) -> ApiResult<ChatDetails> {
    Ok(Json(
        state
            .coordinator
            .select_slot(chat_id, body.actor_id, body.slot_id)
            .await?,
    ))
}

pub async fn complete_chat(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<ChatId>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<ChatDetails> {
    Ok(Json(state.coordinator.complete(chat_id, body.actor_id).await?))
}

pub async fn cancel_chat(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<ChatId>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<ChatDetails> {
    Ok(Json(state.coordinator.cancel(chat_id, body.actor_id).await?))
}
