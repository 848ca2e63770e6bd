use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{ChatId, MatchId, MemberId};

/// Scheduling domain fact events
///
/// Emitted after a transition has been committed. Consumers (notifications,
/// recognition bookkeeping) must not be able to fail the transition itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulingEvent {
    MatchAccepted {
        match_id: MatchId,
        chat_id: ChatId,
        requester_id: MemberId,
        expert_id: MemberId,
    },
    MatchDeclined {
        match_id: MatchId,
        expert_id: MemberId,
    },
    SlotsProposed {
        chat_id: ChatId,
        requester_id: MemberId,
        slot_count: usize,
    },
    ChatConfirmed {
        chat_id: ChatId,
        requester_id: MemberId,
        expert_id: MemberId,
        scheduled_time: DateTime<Utc>,
        meeting_link: String,
    },
    ChatCompleted {
        chat_id: ChatId,
        requester_id: MemberId,
        expert_id: MemberId,
    },
    ChatCancelled {
        chat_id: ChatId,
        cancelled_by: MemberId,
    },
}

impl SchedulingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulingEvent::MatchAccepted { .. } => "match_accepted",
            SchedulingEvent::MatchDeclined { .. } => "match_declined",
            SchedulingEvent::SlotsProposed { .. } => "slots_proposed",
            SchedulingEvent::ChatConfirmed { .. } => "chat_confirmed",
            SchedulingEvent::ChatCompleted { .. } => "chat_completed",
            SchedulingEvent::ChatCancelled { .. } => "chat_cancelled",
        }
    }
}
