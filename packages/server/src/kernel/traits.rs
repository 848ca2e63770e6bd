// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Ranking and transition rules live in the domains; these traits only move
// records in and out.
//
// Naming convention: Base* for trait names (e.g., BaseMatchStore, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::common::{ChatId, MatchId, MemberId, NeedId};
use crate::domains::matching::models::{MatchSuggestion, Need, Offer};
use crate::domains::member::{Member, ProfileUpdate};
use crate::domains::scheduling::{ChatSnapshot, ChatTransition, SchedulingEvent, SuggestionDecision};
use crate::domains::scheduling::models::{CoffeeChat, ProposedSlot};

// =============================================================================
// Embedding Service Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseEmbeddingService: Send + Sync {
    /// Generate an embedding for a label. Same text, same vector.
    async fn generate(&self, text: &str) -> Result<Vec<f32>>;
}

// =============================================================================
// Notifier Trait (Infrastructure - side effects after a committed transition)
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn publish(&self, event: &SchedulingEvent) -> Result<()>;
}

// =============================================================================
// Match Store Trait (Infrastructure - persistence boundary)
// =============================================================================

/// Active needs and offers read from one consistent snapshot
#[derive(Debug, Clone, Default)]
pub struct ActivePool {
    pub needs: Vec<Need>,
    pub offers: Vec<Offer>,
}

/// Result of a compare-and-set write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The entity moved since the snapshot the plan was computed from
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub members: i64,
    pub active_needs: i64,
    pub active_offers: i64,
    pub suggestions: i64,
    pub pending_suggestions: i64,
    pub chats: i64,
    pub confirmed_chats: i64,
}

#[async_trait]
pub trait BaseMatchStore: Send + Sync {
    // Members

    async fn insert_member(&self, member: &Member) -> Result<()>;

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>>;

    /// Registration order
    async fn list_members(&self) -> Result<Vec<Member>>;

    /// Apply a profile edit. Returns the updated member, or None if it does
    /// not exist.
    async fn update_member_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Option<Member>>;

    /// Persist a check-in and merge its offers into the member's skills, all
    /// or nothing. Returns the updated member, or None if it does not exist.
    async fn record_check_in(
        &self,
        member_id: MemberId,
        needs: &[Need],
        offers: &[Offer],
    ) -> Result<Option<Member>>;

    // Needs, offers, suggestions

    async fn find_need(&self, id: NeedId) -> Result<Option<Need>>;

    async fn active_pool(&self) -> Result<ActivePool>;

    /// Upsert keyed on (need_id, expert_id). Self-matches and suggestions
    /// whose need or offer is no longer active are skipped. Returns the
    /// number of rows written.
    async fn upsert_suggestions(&self, suggestions: &[MatchSuggestion]) -> Result<usize>;

    async fn find_suggestion(&self, id: MatchId) -> Result<Option<MatchSuggestion>>;

    /// Best first
    async fn suggestions_for_requester(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>>;

    /// Best first
    async fn suggestions_for_expert(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>>;

    /// Move a pending suggestion to its next status (and open its chat) if
    /// it is still pending.
    async fn apply_suggestion_decision(&self, decision: &SuggestionDecision) -> Result<ApplyOutcome>;

    // Chats

    async fn find_chat(&self, id: ChatId) -> Result<Option<CoffeeChat>>;

    /// Chat, its slots and the need behind it
    async fn load_chat_snapshot(&self, id: ChatId) -> Result<Option<ChatSnapshot>>;

    /// Newest first
    async fn chats_for_member(&self, member_id: MemberId) -> Result<Vec<CoffeeChat>>;

    async fn slots_for_chat(&self, chat_id: ChatId) -> Result<Vec<ProposedSlot>>;

    /// Apply a chat transition if the chat is still at `expected_version`
    async fn apply_chat_transition(&self, transition: &ChatTransition) -> Result<ApplyOutcome>;

    // Reporting

    /// Every need regardless of status, newest first
    async fn all_needs(&self) -> Result<Vec<Need>>;

    /// Every offer regardless of status, newest first
    async fn all_offers(&self) -> Result<Vec<Offer>>;

    /// Best first
    async fn all_suggestions(&self) -> Result<Vec<MatchSuggestion>>;

    /// Newest first
    async fn all_chats(&self) -> Result<Vec<CoffeeChat>>;

    async fn stats(&self) -> Result<DashboardStats>;
}
