//! Scheduling domain machines.
//!
//! Machines are pure decision makers: a snapshot, an actor and an action go
//! in; a transition plan (or a refusal) comes out. NO IO, NO async, nothing
//! is mutated. The coordinator hands the plan to the store, which applies it
//! atomically with a compare-and-set on the snapshot it was computed from.
//!
//! # Lifecycle
//!
//! ```text
//! MatchSuggestion: pending ──accept──▶ accepted (opens CoffeeChat)
//!                     └────decline──▶ declined
//!
//! CoffeeChat: pending_slots ──propose──▶ pending_confirmation ──select──▶ confirmed ──complete──▶ completed
//!                  │                      │   ▲ propose (replace)            │
//!                  └──────────────────────┴───┴──────cancel / complete───────┴──▶ cancelled / completed
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::common::{MatchError, MatchId, MatchResult, MemberId, NeedId, SlotId};
use crate::domains::matching::models::{MatchSuggestion, SuggestionStatus};
use crate::domains::scheduling::events::SchedulingEvent;
use crate::domains::scheduling::models::{ChatStatus, CoffeeChat, ProposedSlot, SlotStatus};

// =============================================================================
// SuggestionMachine - accept / decline
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionAction {
    Accept,
    Decline,
}

/// Outcome of deciding on a pending suggestion
#[derive(Debug, Clone)]
pub struct SuggestionDecision {
    pub match_id: MatchId,
    pub next: SuggestionStatus,
    /// Chat to create together with the status change (accept only)
    pub chat: Option<CoffeeChat>,
    pub event: SchedulingEvent,
}

pub struct SuggestionMachine;

impl SuggestionMachine {
    pub fn decide(
        suggestion: &MatchSuggestion,
        actor_id: MemberId,
        action: SuggestionAction,
    ) -> MatchResult<SuggestionDecision> {
        if actor_id != suggestion.expert_id {
            return Err(MatchError::Unauthorized(
                "only the suggested expert can accept or decline a match".into(),
            ));
        }

        if suggestion.status != SuggestionStatus::Pending {
            return Err(MatchError::InvalidTransition(format!(
                "match {} is already {}",
                suggestion.id, suggestion.status
            )));
        }

        let decision = match action {
            SuggestionAction::Accept => {
                let chat = CoffeeChat::open(suggestion);
                SuggestionDecision {
                    match_id: suggestion.id,
                    next: SuggestionStatus::Accepted,
                    event: SchedulingEvent::MatchAccepted {
                        match_id: suggestion.id,
                        chat_id: chat.id,
                        requester_id: suggestion.requester_id,
                        expert_id: suggestion.expert_id,
                    },
                    chat: Some(chat),
                }
            }
            SuggestionAction::Decline => SuggestionDecision {
                match_id: suggestion.id,
                next: SuggestionStatus::Declined,
                chat: None,
                event: SchedulingEvent::MatchDeclined {
                    match_id: suggestion.id,
                    expert_id: suggestion.expert_id,
                },
            },
        };

        Ok(decision)
    }
}

// =============================================================================
// ChatMachine - slots, confirmation, completion, cancellation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    ProposeSlots { times: Vec<DateTime<Utc>> },
    SelectSlot { slot_id: SlotId },
    Complete,
    Cancel,
}

/// Everything the machine needs to know about one chat
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub chat: CoffeeChat,
    pub slots: Vec<ProposedSlot>,
    /// Need behind the chat's match (resolved on completion)
    pub need_id: Option<NeedId>,
}

/// A planned chat transition, applied all-or-nothing by the store
#[derive(Debug, Clone)]
pub struct ChatTransition {
    /// Version the plan was computed from; the write fails if it moved
    pub expected_version: i32,
    /// The chat as it will be stored
    pub chat: CoffeeChat,
    pub new_slots: Vec<ProposedSlot>,
    pub slot_updates: Vec<(SlotId, SlotStatus)>,
    pub resolve_need: Option<NeedId>,
    pub event: SchedulingEvent,
}

impl ChatTransition {
    fn new(current: &CoffeeChat, status: ChatStatus, event: SchedulingEvent) -> Self {
        let mut chat = current.clone();
        chat.status = status;
        chat.version = current.version + 1;
        Self {
            expected_version: current.version,
            chat,
            new_slots: Vec::new(),
            slot_updates: Vec::new(),
            resolve_need: None,
            event,
        }
    }
}

pub struct ChatMachine {
    meeting_base_url: String,
}

impl ChatMachine {
    pub fn new(meeting_base_url: impl Into<String>) -> Self {
        Self {
            meeting_base_url: meeting_base_url.into(),
        }
    }

    pub fn decide(
        &self,
        snapshot: &ChatSnapshot,
        actor_id: MemberId,
        action: ChatAction,
    ) -> MatchResult<ChatTransition> {
        match action {
            ChatAction::ProposeSlots { times } => propose_slots(snapshot, actor_id, times),
            ChatAction::SelectSlot { slot_id } => self.select_slot(snapshot, actor_id, slot_id),
            ChatAction::Complete => complete(snapshot, actor_id),
            ChatAction::Cancel => cancel(snapshot, actor_id),
        }
    }

    fn select_slot(
        &self,
        snapshot: &ChatSnapshot,
        actor_id: MemberId,
        slot_id: SlotId,
    ) -> MatchResult<ChatTransition> {
        let chat = &snapshot.chat;

        if actor_id != chat.requester_id {
            return Err(MatchError::Unauthorized(
                "only the requester can select a slot".into(),
            ));
        }

        match chat.status {
            ChatStatus::PendingConfirmation => {}
            ChatStatus::PendingSlots => {
                return Err(MatchError::InvalidTransition(format!(
                    "chat {} has no proposed slots yet",
                    chat.id
                )))
            }
            status => {
                return Err(MatchError::InvalidTransition(format!(
                    "cannot select a slot on a {} chat",
                    status
                )))
            }
        }

        let selected = snapshot
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| MatchError::not_found("ProposedSlot", slot_id))?;

        if selected.status != SlotStatus::Pending {
            return Err(MatchError::InvalidTransition(format!(
                "slot {} is no longer open",
                slot_id
            )));
        }

        let meeting_link = CoffeeChat::meeting_link_for(&self.meeting_base_url, chat.id);

        let mut transition = ChatTransition::new(
            chat,
            ChatStatus::Confirmed,
            SchedulingEvent::ChatConfirmed {
                chat_id: chat.id,
                requester_id: chat.requester_id,
                expert_id: chat.expert_id,
                scheduled_time: selected.slot_time,
                meeting_link: meeting_link.clone(),
            },
        );
        transition.chat.scheduled_time = Some(selected.slot_time);
        transition.chat.meeting_link = Some(meeting_link);

        // Exactly one accepted slot per chat: the chosen one
        transition.slot_updates.push((selected.id, SlotStatus::Accepted));
        transition.slot_updates.extend(
            snapshot
                .slots
                .iter()
                .filter(|s| s.id != slot_id && s.status != SlotStatus::Declined)
                .map(|s| (s.id, SlotStatus::Declined)),
        );

        Ok(transition)
    }
}

fn propose_slots(
    snapshot: &ChatSnapshot,
    actor_id: MemberId,
    times: Vec<DateTime<Utc>>,
) -> MatchResult<ChatTransition> {
    let chat = &snapshot.chat;

    if actor_id != chat.expert_id {
        return Err(MatchError::Unauthorized(
            "only the expert can propose slots".into(),
        ));
    }

    if !matches!(
        chat.status,
        ChatStatus::PendingSlots | ChatStatus::PendingConfirmation
    ) {
        return Err(MatchError::InvalidTransition(format!(
            "cannot propose slots on a {} chat",
            chat.status
        )));
    }

    if times.is_empty() {
        return Err(MatchError::Validation(
            "at least one slot time is required".into(),
        ));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = times.iter().find(|t| !seen.insert(**t)) {
        return Err(MatchError::Validation(format!(
            "slot time {} was proposed twice",
            duplicate.to_rfc3339()
        )));
    }

    let mut transition = ChatTransition::new(
        chat,
        ChatStatus::PendingConfirmation,
        SchedulingEvent::SlotsProposed {
            chat_id: chat.id,
            requester_id: chat.requester_id,
            slot_count: times.len(),
        },
    );

    // Replace-on-repeat: a new proposal supersedes any still-open slots
    transition.slot_updates.extend(
        snapshot
            .slots
            .iter()
            .filter(|s| s.status == SlotStatus::Pending)
            .map(|s| (s.id, SlotStatus::Declined)),
    );

    let offset = snapshot.slots.len() as i32;
    transition.new_slots = times
        .into_iter()
        .enumerate()
        .map(|(i, time)| ProposedSlot::new(chat.id, actor_id, time, offset + i as i32))
        .collect();

    Ok(transition)
}

fn complete(snapshot: &ChatSnapshot, actor_id: MemberId) -> MatchResult<ChatTransition> {
    let chat = &snapshot.chat;
    ensure_participant(chat, actor_id)?;
    ensure_not_terminal(chat)?;

    let mut transition = ChatTransition::new(
        chat,
        ChatStatus::Completed,
        SchedulingEvent::ChatCompleted {
            chat_id: chat.id,
            requester_id: chat.requester_id,
            expert_id: chat.expert_id,
        },
    );
    transition.resolve_need = snapshot.need_id;
    Ok(transition)
}

fn cancel(snapshot: &ChatSnapshot, actor_id: MemberId) -> MatchResult<ChatTransition> {
    let chat = &snapshot.chat;
    ensure_participant(chat, actor_id)?;
    ensure_not_terminal(chat)?;

    Ok(ChatTransition::new(
        chat,
        ChatStatus::Cancelled,
        SchedulingEvent::ChatCancelled {
            chat_id: chat.id,
            cancelled_by: actor_id,
        },
    ))
}

fn ensure_participant(chat: &CoffeeChat, actor_id: MemberId) -> MatchResult<()> {
    if chat.is_participant(actor_id) {
        Ok(())
    } else {
        Err(MatchError::Unauthorized(format!(
            "member {} is not part of chat {}",
            actor_id, chat.id
        )))
    }
}

fn ensure_not_terminal(chat: &CoffeeChat) -> MatchResult<()> {
    if chat.status.is_terminal() {
        Err(MatchError::InvalidTransition(format!(
            "chat {} is already {}",
            chat.id, chat.status
        )))
    } else {
        Ok(())
    }
}
