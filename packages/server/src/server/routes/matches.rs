use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;

use crate::common::{MatchId, MemberId};
use crate::domains::lifecycle::ChatDetails;
use crate::domains::matching::{EnrichedMatch, MatchSuggestion};
use crate::server::app::AppState;
use crate::server::error::ApiResult;

/// Body for actions that only need to know who is acting
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor_id: MemberId,
}

pub async fn member_matches(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<Vec<EnrichedMatch>> {
    Ok(Json(state.coordinator.matches_for_member(member_id).await?))
}

pub async fn expert_matches(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<Vec<EnrichedMatch>> {
    Ok(Json(state.coordinator.expert_inbox(member_id).await?))
}

pub async fn accept_match(
    Extension(state): Extension<AppState>,
    Path(match_id): Path<MatchId>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<ChatDetails> {
    Ok(Json(state.coordinator.accept(match_id, body.actor_id).await?))
}

pub async fn decline_match(
    Extension(state): Extension<AppState>,
    Path(match_id): Path<MatchId>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<MatchSuggestion> {
    Ok(Json(state.coordinator.decline(match_id, body.actor_id).await?))
}
