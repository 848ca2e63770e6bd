//! Lifecycle coordinator
//!
//! Drives the ranker on check-in and the scheduling machines on user actions.
//! Every operation follows the same shape:
//!
//! 1. load a snapshot from the store
//! 2. ask the pure machine for a plan
//! 3. apply the plan as one compare-and-set write
//! 4. publish the resulting event (failures are logged, never returned)
//!
//! Steps 1-3 run under the request timeout.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::data::{ChatDetails, CheckInOutcome, OwnedNeed, OwnedOffer};
use crate::common::{ChatId, MatchError, MatchId, MatchResult, MemberId, SlotId};
use crate::config::{Config, DEFAULT_MEETING_BASE_URL};
use crate::domains::matching::actions::{rank_pool, EmbeddingCache, DEFAULT_MATCH_LIMIT};
use crate::domains::matching::utils::check_relevance_to_skills;
use crate::domains::matching::{CheckIn, EnrichedMatch, MatchSuggestion, SuggestionStatus};
use crate::domains::member::{Member, NewMember, ProfileUpdate};
use crate::domains::scheduling::models::CoffeeChat;
use crate::domains::scheduling::{
    ChatAction, ChatMachine, SchedulingEvent, SuggestionAction, SuggestionMachine,
};
use crate::kernel::{ApplyOutcome, DashboardStats, ServerDeps};

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Suggestions kept per need in a ranking pass
    pub match_limit: usize,
    /// Suggestions returned after a check-in
    pub top_matches: usize,
    pub request_timeout: Duration,
    pub meeting_base_url: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            match_limit: DEFAULT_MATCH_LIMIT,
            top_matches: 3,
            request_timeout: Duration::from_secs(10),
            meeting_base_url: DEFAULT_MEETING_BASE_URL.to_string(),
        }
    }
}

impl From<&Config> for CoordinatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            match_limit: config.match_limit,
            top_matches: config.top_matches,
            request_timeout: config.request_timeout,
            meeting_base_url: config.meeting_base_url.clone(),
        }
    }
}

pub struct LifecycleCoordinator {
    deps: ServerDeps,
    settings: CoordinatorSettings,
    chat_machine: ChatMachine,
}

impl LifecycleCoordinator {
    pub fn new(deps: ServerDeps, settings: CoordinatorSettings) -> Self {
        let chat_machine = ChatMachine::new(settings.meeting_base_url.clone());
        Self {
            deps,
            settings,
            chat_machine,
        }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    // =========================================================================
    // Members
    // =========================================================================

    #[instrument(skip(self, new_member), fields(name = %new_member.name))]
    pub async fn register_member(&self, new_member: NewMember) -> MatchResult<Member> {
        new_member.validate()?;
        let member = new_member.into_member();

        self.within("register_member", async {
            self.deps.store.insert_member(&member).await?;
            Ok(())
        })
        .await?;

        info!(member_id = %member.id, "Member registered");
        Ok(member)
    }

    #[instrument(skip(self))]
    pub async fn get_member(&self, member_id: MemberId) -> MatchResult<Member> {
        self.within("get_member", self.require_member(member_id)).await
    }

    #[instrument(skip(self))]
    pub async fn list_members(&self) -> MatchResult<Vec<Member>> {
        self.within("list_members", async {
            Ok(self.deps.store.list_members().await?)
        })
        .await
    }

    /// Members edit only their own profile
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        member_id: MemberId,
        actor_id: MemberId,
        update: ProfileUpdate,
    ) -> MatchResult<Member> {
        update.validate()?;

        let member = self
            .within("update_profile", async {
                self.require_member(member_id).await?;
                if actor_id != member_id {
                    return Err(MatchError::Unauthorized(format!(
                        "member {} cannot edit the profile of {}",
                        actor_id, member_id
                    )));
                }
                self.deps
                    .store
                    .update_member_profile(member_id, &update)
                    .await?
                    .ok_or_else(|| MatchError::not_found("Member", member_id))
            })
            .await?;

        info!("Profile updated");
        Ok(member)
    }

    // =========================================================================
    // Check-in and ranking
    // =========================================================================

    /// Record a check-in, re-rank the active pool and return the member's
    /// best pending suggestions.
    ///
    /// The pool plus the new records is ranked before anything is written,
    /// so a timeout while embedding leaves the store untouched and the
    /// check-in can be retried safely.
    #[instrument(skip(self, check_in), fields(member_id = %check_in.member_id))]
    pub async fn submit_check_in(&self, check_in: CheckIn) -> MatchResult<CheckInOutcome> {
        let member_id = check_in.member_id;
        let (needs, offers) = check_in.into_records()?;

        let drafts = self
            .within("rank_check_in", async {
                self.require_member(member_id).await?;

                let mut pool = self.deps.store.active_pool().await?;
                pool.needs.extend(needs.iter().cloned());
                pool.offers.extend(offers.iter().cloned());

                let mut cache = EmbeddingCache::new(self.deps.embedding_service.clone());
                Ok(rank_pool(&pool.needs, &pool.offers, self.settings.match_limit, &mut cache).await?)
            })
            .await?;

        let outcome = self
            .within("commit_check_in", async {
                let member = self
                    .deps
                    .store
                    .record_check_in(member_id, &needs, &offers)
                    .await?
                    .ok_or_else(|| MatchError::not_found("Member", member_id))?;
                let suggestions_written = self.deps.store.upsert_suggestions(&drafts).await?;

                let top: Vec<MatchSuggestion> = self
                    .deps
                    .store
                    .suggestions_for_requester(member_id)
                    .await?
                    .into_iter()
                    .filter(|s| s.status == SuggestionStatus::Pending)
                    .take(self.settings.top_matches)
                    .collect();
                let matches = self.enrich(top).await?;

                Ok(CheckInOutcome {
                    member,
                    needs: needs.clone(),
                    offers: offers.clone(),
                    suggestions_written,
                    matches,
                })
            })
            .await?;

        info!(
            needs = outcome.needs.len(),
            offers = outcome.offers.len(),
            suggestions_written = outcome.suggestions_written,
            matches = outcome.matches.len(),
            "Check-in processed"
        );
        Ok(outcome)
    }

    // =========================================================================
    // Suggestion transitions
    // =========================================================================

    /// Expert accepts a suggestion; opens the coffee chat
    #[instrument(skip(self))]
    pub async fn accept(&self, match_id: MatchId, actor_id: MemberId) -> MatchResult<ChatDetails> {
        let (details, event) = self
            .within("accept", async {
                let suggestion = self.require_suggestion(match_id).await?;
                let decision =
                    SuggestionMachine::decide(&suggestion, actor_id, SuggestionAction::Accept)?;

                if self.deps.store.apply_suggestion_decision(&decision).await? == ApplyOutcome::Stale {
                    return Err(MatchError::stale("MatchSuggestion", match_id));
                }

                let chat = decision
                    .chat
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("accepted match {} opened no chat", match_id))?;
                let details = self.chat_details(chat).await?;
                Ok((details, decision.event))
            })
            .await?;

        info!(chat_id = %details.chat.id, "Match accepted");
        self.notify(&event).await;
        Ok(details)
    }

    #[instrument(skip(self))]
    pub async fn decline(
        &self,
        match_id: MatchId,
        actor_id: MemberId,
    ) -> MatchResult<MatchSuggestion> {
        let (suggestion, event) = self
            .within("decline", async {
                let mut suggestion = self.require_suggestion(match_id).await?;
                let decision =
                    SuggestionMachine::decide(&suggestion, actor_id, SuggestionAction::Decline)?;

                if self.deps.store.apply_suggestion_decision(&decision).await? == ApplyOutcome::Stale {
                    return Err(MatchError::stale("MatchSuggestion", match_id));
                }

                suggestion.status = decision.next;
                Ok((suggestion, decision.event))
            })
            .await?;

        info!("Match declined");
        self.notify(&event).await;
        Ok(suggestion)
    }

    // =========================================================================
    // Chat transitions
    // =========================================================================

    #[instrument(skip(self, slot_times), fields(slot_count = slot_times.len()))]
    pub async fn propose_slots(
        &self,
        chat_id: ChatId,
        actor_id: MemberId,
        slot_times: Vec<DateTime<Utc>>,
    ) -> MatchResult<ChatDetails> {
        self.run_chat_action(
            "propose_slots",
            chat_id,
            actor_id,
            ChatAction::ProposeSlots { times: slot_times },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn select_slot(
        &self,
        chat_id: ChatId,
        actor_id: MemberId,
        slot_id: SlotId,
    ) -> MatchResult<ChatDetails> {
        self.run_chat_action("select_slot", chat_id, actor_id, ChatAction::SelectSlot { slot_id })
            .await
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, chat_id: ChatId, actor_id: MemberId) -> MatchResult<ChatDetails> {
        self.run_chat_action("complete", chat_id, actor_id, ChatAction::Complete)
            .await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, chat_id: ChatId, actor_id: MemberId) -> MatchResult<ChatDetails> {
        self.run_chat_action("cancel", chat_id, actor_id, ChatAction::Cancel)
            .await
    }

    async fn run_chat_action(
        &self,
        operation: &'static str,
        chat_id: ChatId,
        actor_id: MemberId,
        action: ChatAction,
    ) -> MatchResult<ChatDetails> {
        let (details, event) = self
            .within(operation, async {
                let snapshot = self
                    .deps
                    .store
                    .load_chat_snapshot(chat_id)
                    .await?
                    .ok_or_else(|| MatchError::not_found("CoffeeChat", chat_id))?;

                let transition = self.chat_machine.decide(&snapshot, actor_id, action)?;

                if self.deps.store.apply_chat_transition(&transition).await? == ApplyOutcome::Stale {
                    return Err(MatchError::stale("CoffeeChat", chat_id));
                }

                let details = self.chat_details(transition.chat).await?;
                Ok((details, transition.event))
            })
            .await?;

        info!(
            operation,
            status = %details.chat.status,
            version = details.chat.version,
            "Chat transition applied"
        );
        self.notify(&event).await;
        Ok(details)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Suggestions where the member is the requester, best first
    #[instrument(skip(self))]
    pub async fn matches_for_member(&self, member_id: MemberId) -> MatchResult<Vec<EnrichedMatch>> {
        self.within("matches_for_member", async {
            self.require_member(member_id).await?;
            let suggestions = self.deps.store.suggestions_for_requester(member_id).await?;
            self.enrich(suggestions).await
        })
        .await
    }

    /// Pending suggestions where the member is the expert, limited to needs
    /// that touch the member's skills
    #[instrument(skip(self))]
    pub async fn expert_inbox(&self, member_id: MemberId) -> MatchResult<Vec<EnrichedMatch>> {
        self.within("expert_inbox", async {
            let member = self.require_member(member_id).await?;
            let suggestions = self.deps.store.suggestions_for_expert(member_id).await?;

            let mut relevant = Vec::new();
            for suggestion in suggestions
                .into_iter()
                .filter(|s| s.status == SuggestionStatus::Pending)
            {
                let Some(need) = self.deps.store.find_need(suggestion.need_id).await? else {
                    continue;
                };
                if check_relevance_to_skills(&need.label, need.category.as_str(), &member.skills)
                    .is_relevant()
                {
                    relevant.push(suggestion);
                }
            }

            self.enrich(relevant).await
        })
        .await
    }

    /// Chats where the member is either party, newest first
    #[instrument(skip(self))]
    pub async fn chats_for_member(&self, member_id: MemberId) -> MatchResult<Vec<ChatDetails>> {
        self.within("chats_for_member", async {
            self.require_member(member_id).await?;
            let chats = self.deps.store.chats_for_member(member_id).await?;

            let mut details = Vec::with_capacity(chats.len());
            for chat in chats {
                details.push(self.chat_details(chat).await?);
            }
            Ok(details)
        })
        .await
    }

    // =========================================================================
    // Admin listings
    // =========================================================================

    /// Every need with its requester's profile, newest first
    #[instrument(skip(self))]
    pub async fn all_needs(&self) -> MatchResult<Vec<OwnedNeed>> {
        self.within("all_needs", async {
            let needs = self.deps.store.all_needs().await?;
            let mut profiles = HashMap::new();
            let mut owned = Vec::with_capacity(needs.len());
            for need in needs {
                let member = self.cached_profile(&mut profiles, need.requester_id).await?;
                owned.push(OwnedNeed { need, member });
            }
            Ok(owned)
        })
        .await
    }

    /// Every offer with its owner's profile, newest first
    #[instrument(skip(self))]
    pub async fn all_offers(&self) -> MatchResult<Vec<OwnedOffer>> {
        self.within("all_offers", async {
            let offers = self.deps.store.all_offers().await?;
            let mut profiles = HashMap::new();
            let mut owned = Vec::with_capacity(offers.len());
            for offer in offers {
                let member = self.cached_profile(&mut profiles, offer.owner_id).await?;
                owned.push(OwnedOffer { offer, member });
            }
            Ok(owned)
        })
        .await
    }

    /// Every suggestion in any status, best first
    #[instrument(skip(self))]
    pub async fn all_matches(&self) -> MatchResult<Vec<EnrichedMatch>> {
        self.within("all_matches", async {
            let suggestions = self.deps.store.all_suggestions().await?;
            self.enrich(suggestions).await
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn all_chats(&self) -> MatchResult<Vec<ChatDetails>> {
        self.within("all_chats", async {
            let chats = self.deps.store.all_chats().await?;
            let mut details = Vec::with_capacity(chats.len());
            for chat in chats {
                details.push(self.chat_details(chat).await?);
            }
            Ok(details)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> MatchResult<DashboardStats> {
        self.within("dashboard_stats", async {
            Ok(self.deps.store.stats().await?)
        })
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn within<T, F>(&self, operation: &'static str, future: F) -> MatchResult<T>
    where
        F: Future<Output = MatchResult<T>>,
    {
        let limit = self.settings.request_timeout;
        match tokio::time::timeout(limit, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = limit.as_millis() as u64, "Request timed out");
                Err(MatchError::Timeout(limit))
            }
        }
    }

    async fn notify(&self, event: &SchedulingEvent) {
        if let Err(e) = self.deps.notifier.publish(event).await {
            warn!(event = event.name(), error = %e, "Failed to publish scheduling event");
        }
    }

    async fn require_member(&self, member_id: MemberId) -> MatchResult<Member> {
        self.deps
            .store
            .find_member(member_id)
            .await?
            .ok_or_else(|| MatchError::not_found("Member", member_id))
    }

    async fn require_suggestion(&self, match_id: MatchId) -> MatchResult<MatchSuggestion> {
        self.deps
            .store
            .find_suggestion(match_id)
            .await?
            .ok_or_else(|| MatchError::not_found("MatchSuggestion", match_id))
    }

    async fn chat_details(&self, chat: CoffeeChat) -> MatchResult<ChatDetails> {
        let slots = self.deps.store.slots_for_chat(chat.id).await?;
        let requester = self.deps.store.find_member(chat.requester_id).await?;
        let expert = self.deps.store.find_member(chat.expert_id).await?;
        Ok(ChatDetails {
            chat,
            requester,
            expert,
            slots,
        })
    }

    async fn enrich(&self, suggestions: Vec<MatchSuggestion>) -> MatchResult<Vec<EnrichedMatch>> {
        let mut profiles: HashMap<MemberId, Option<Member>> = HashMap::new();
        let mut enriched = Vec::with_capacity(suggestions.len());

        for suggestion in suggestions {
            let requester = self.cached_profile(&mut profiles, suggestion.requester_id).await?;
            let expert = self.cached_profile(&mut profiles, suggestion.expert_id).await?;
            let need = self.deps.store.find_need(suggestion.need_id).await?;
            enriched.push(EnrichedMatch {
                suggestion,
                requester,
                expert,
                need,
            });
        }

        Ok(enriched)
    }

    async fn cached_profile(
        &self,
        profiles: &mut HashMap<MemberId, Option<Member>>,
        member_id: MemberId,
    ) -> MatchResult<Option<Member>> {
        if let Some(profile) = profiles.get(&member_id) {
            return Ok(profile.clone());
        }
        let profile = self.deps.store.find_member(member_id).await?;
        profiles.insert(member_id, profile.clone());
        Ok(profile)
    }
}
