//! In-memory match store
//!
//! Every mutation runs under a single write guard, and every multi-record read
//! under a single read guard, so each call observes and produces a consistent
//! state. Used by tests and by the server when no DATABASE_URL is set.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::traits::{ActivePool, ApplyOutcome, BaseMatchStore, DashboardStats};
use crate::common::{ChatId, MatchId, MemberId, NeedId};
use crate::domains::matching::models::{MatchSuggestion, Need, NeedStatus, Offer, SuggestionStatus};
use crate::domains::member::{Member, ProfileUpdate};
use crate::domains::scheduling::models::{ChatStatus, CoffeeChat, ProposedSlot};
use crate::domains::scheduling::{ChatSnapshot, ChatTransition, SuggestionDecision};

#[derive(Default)]
struct Tables {
    members: HashMap<MemberId, Member>,
    // Insertion order is creation order
    needs: Vec<Need>,
    offers: Vec<Offer>,
    suggestions: Vec<MatchSuggestion>,
    chats: HashMap<ChatId, CoffeeChat>,
    slots: Vec<ProposedSlot>,
}

impl Tables {
    fn need_is_active(&self, id: NeedId) -> bool {
        self.needs.iter().any(|n| n.id == id && n.is_active())
    }

    fn offer_is_active(&self, suggestion: &MatchSuggestion) -> bool {
        self.offers
            .iter()
            .any(|o| o.id == suggestion.offer_id && o.is_active())
    }

    fn sorted_suggestions(&self, keep: impl Fn(&MatchSuggestion) -> bool) -> Vec<MatchSuggestion> {
        let mut found: Vec<MatchSuggestion> =
            self.suggestions.iter().filter(|s| keep(s)).cloned().collect();
        found.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        found
    }

    fn slots_for(&self, chat_id: ChatId) -> Vec<ProposedSlot> {
        let mut slots: Vec<ProposedSlot> = self
            .slots
            .iter()
            .filter(|s| s.chat_id == chat_id)
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.position);
        slots
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseMatchStore for InMemoryStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.tables.read().await.members.get(&id).cloned())
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        let tables = self.tables.read().await;
        let mut members: Vec<Member> = tables.members.values().cloned().collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    async fn update_member_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Option<Member>> {
        let mut tables = self.tables.write().await;
        Ok(tables.members.get_mut(&id).map(|member| {
            member.apply_profile(update);
            member.clone()
        }))
    }

    async fn record_check_in(
        &self,
        member_id: MemberId,
        needs: &[Need],
        offers: &[Offer],
    ) -> Result<Option<Member>> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let Some(member) = tables.members.get_mut(&member_id) else {
            return Ok(None);
        };
        let skills: Vec<_> = offers.iter().map(Offer::as_skill).collect();
        member.merge_skills(&skills);
        let member = member.clone();

        tables.needs.extend_from_slice(needs);
        tables.offers.extend_from_slice(offers);

        Ok(Some(member))
    }

    async fn find_need(&self, id: NeedId) -> Result<Option<Need>> {
        let tables = self.tables.read().await;
        Ok(tables.needs.iter().find(|n| n.id == id).cloned())
    }

    async fn active_pool(&self) -> Result<ActivePool> {
        let tables = self.tables.read().await;
        Ok(ActivePool {
            needs: tables.needs.iter().filter(|n| n.is_active()).cloned().collect(),
            offers: tables.offers.iter().filter(|o| o.is_active()).cloned().collect(),
        })
    }

    async fn upsert_suggestions(&self, suggestions: &[MatchSuggestion]) -> Result<usize> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let mut written = 0;

        for suggestion in suggestions {
            if suggestion.is_self_match()
                || !tables.need_is_active(suggestion.need_id)
                || !tables.offer_is_active(suggestion)
            {
                continue;
            }

            let existing = tables.suggestions.iter_mut().find(|s| {
                s.need_id == suggestion.need_id && s.expert_id == suggestion.expert_id
            });

            match existing {
                Some(current) if current.status == SuggestionStatus::Pending => {
                    current.score = suggestion.score;
                    current.reason = suggestion.reason.clone();
                    current.offer_id = suggestion.offer_id;
                    written += 1;
                }
                Some(_) => {}
                None => {
                    let mut fresh = suggestion.clone();
                    fresh.status = SuggestionStatus::Pending;
                    tables.suggestions.push(fresh);
                    written += 1;
                }
            }
        }

        Ok(written)
    }

    async fn find_suggestion(&self, id: MatchId) -> Result<Option<MatchSuggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.suggestions.iter().find(|s| s.id == id).cloned())
    }

    async fn suggestions_for_requester(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_suggestions(|s| s.requester_id == member_id))
    }

    async fn suggestions_for_expert(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_suggestions(|s| s.expert_id == member_id))
    }

    async fn apply_suggestion_decision(&self, decision: &SuggestionDecision) -> Result<ApplyOutcome> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let chat_exists = tables
            .chats
            .values()
            .any(|c| c.match_id == decision.match_id);

        let Some(suggestion) = tables
            .suggestions
            .iter_mut()
            .find(|s| s.id == decision.match_id)
        else {
            return Ok(ApplyOutcome::Stale);
        };

        if suggestion.status != SuggestionStatus::Pending || chat_exists {
            return Ok(ApplyOutcome::Stale);
        }

        suggestion.status = decision.next;
        if let Some(chat) = &decision.chat {
            tables.chats.insert(chat.id, chat.clone());
        }

        Ok(ApplyOutcome::Applied)
    }

    async fn find_chat(&self, id: ChatId) -> Result<Option<CoffeeChat>> {
        Ok(self.tables.read().await.chats.get(&id).cloned())
    }

    async fn load_chat_snapshot(&self, id: ChatId) -> Result<Option<ChatSnapshot>> {
        let tables = self.tables.read().await;
        let Some(chat) = tables.chats.get(&id).cloned() else {
            return Ok(None);
        };

        let need_id = tables
            .suggestions
            .iter()
            .find(|s| s.id == chat.match_id)
            .map(|s| s.need_id);

        Ok(Some(ChatSnapshot {
            slots: tables.slots_for(id),
            chat,
            need_id,
        }))
    }

    async fn chats_for_member(&self, member_id: MemberId) -> Result<Vec<CoffeeChat>> {
        let tables = self.tables.read().await;
        let mut chats: Vec<CoffeeChat> = tables
            .chats
            .values()
            .filter(|c| c.is_participant(member_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(chats)
    }

    async fn slots_for_chat(&self, chat_id: ChatId) -> Result<Vec<ProposedSlot>> {
        Ok(self.tables.read().await.slots_for(chat_id))
    }

    async fn apply_chat_transition(&self, transition: &ChatTransition) -> Result<ApplyOutcome> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let chat_id = transition.chat.id;

        match tables.chats.get(&chat_id) {
            Some(current) if current.version == transition.expected_version => {}
            _ => return Ok(ApplyOutcome::Stale),
        }

        for (slot_id, status) in &transition.slot_updates {
            if let Some(slot) = tables
                .slots
                .iter_mut()
                .find(|s| s.id == *slot_id && s.chat_id == chat_id)
            {
                slot.status = *status;
            }
        }
        tables.slots.extend(transition.new_slots.iter().cloned());

        if let Some(need_id) = transition.resolve_need {
            if let Some(need) = tables.needs.iter_mut().find(|n| n.id == need_id) {
                need.status = NeedStatus::Resolved;
            }
        }

        tables.chats.insert(chat_id, transition.chat.clone());
        Ok(ApplyOutcome::Applied)
    }

    async fn all_needs(&self) -> Result<Vec<Need>> {
        let tables = self.tables.read().await;
        Ok(tables.needs.iter().rev().cloned().collect())
    }

    async fn all_offers(&self) -> Result<Vec<Offer>> {
        let tables = self.tables.read().await;
        Ok(tables.offers.iter().rev().cloned().collect())
    }

    async fn all_suggestions(&self) -> Result<Vec<MatchSuggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_suggestions(|_| true))
    }

    async fn all_chats(&self) -> Result<Vec<CoffeeChat>> {
        let tables = self.tables.read().await;
        let mut chats: Vec<CoffeeChat> = tables.chats.values().cloned().collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(chats)
    }

    async fn stats(&self) -> Result<DashboardStats> {
        let tables = self.tables.read().await;
        let count = |n: usize| n as i64;

        Ok(DashboardStats {
            members: count(tables.members.len()),
            active_needs: count(tables.needs.iter().filter(|n| n.is_active()).count()),
            active_offers: count(tables.offers.iter().filter(|o| o.is_active()).count()),
            suggestions: count(tables.suggestions.len()),
            pending_suggestions: count(
                tables
                    .suggestions
                    .iter()
                    .filter(|s| s.status == SuggestionStatus::Pending)
                    .count(),
            ),
            chats: count(tables.chats.len()),
            confirmed_chats: count(
                tables
                    .chats
                    .values()
                    .filter(|c| c.status == ChatStatus::Confirmed)
                    .count(),
            ),
        })
    }
}
