//! PostgreSQL match store
//!
//! Thin adapter over the model SQL. Multi-record writes run in one
//! transaction; transitions are compare-and-set on status (suggestions) or
//! version (chats), so a concurrent loser sees `ApplyOutcome::Stale`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use super::traits::{ActivePool, ApplyOutcome, BaseMatchStore, DashboardStats};
use crate::common::{ChatId, MatchId, MemberId, NeedId};
use crate::domains::matching::models::{MatchSuggestion, Need, Offer, SuggestionStatus};
use crate::domains::member::{Member, ProfileUpdate};
use crate::domains::scheduling::models::{CoffeeChat, ProposedSlot};
use crate::domains::scheduling::{ChatSnapshot, ChatTransition, SuggestionDecision};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseMatchStore for PostgresStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        member
            .insert(&self.pool)
            .await
            .context("Failed to insert member")
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Member::find_by_id(id, &self.pool)
            .await
            .context("Failed to load member")
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        Member::find_all(&self.pool)
            .await
            .context("Failed to list members")
    }

    async fn update_member_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Option<Member>> {
        let Some(mut member) = self.find_member(id).await? else {
            return Ok(None);
        };
        member.apply_profile(update);

        if !member
            .save_profile(&self.pool)
            .await
            .context("Failed to update profile")?
        {
            return Ok(None);
        }
        Ok(Some(member))
    }

    async fn record_check_in(
        &self,
        member_id: MemberId,
        needs: &[Need],
        offers: &[Offer],
    ) -> Result<Option<Member>> {
        let mut tx = self.pool.begin().await?;

        let skills: Vec<_> = offers.iter().map(Offer::as_skill).collect();
        let Some(member) = Member::merge_skills_locked(member_id, &skills, &mut *tx).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        for need in needs {
            need.insert(&mut *tx).await.context("Failed to insert need")?;
        }
        for offer in offers {
            offer.insert(&mut *tx).await.context("Failed to insert offer")?;
        }

        tx.commit().await.context("Failed to commit check-in")?;
        Ok(Some(member))
    }

    async fn find_need(&self, id: NeedId) -> Result<Option<Need>> {
        Need::find_by_id(id, &self.pool)
            .await
            .context("Failed to load need")
    }

    async fn active_pool(&self) -> Result<ActivePool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let needs = Need::find_active(&mut *tx).await?;
        let offers = Offer::find_active(&mut *tx).await?;
        tx.commit().await?;

        Ok(ActivePool { needs, offers })
    }

    async fn upsert_suggestions(&self, suggestions: &[MatchSuggestion]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for suggestion in suggestions.iter().filter(|s| !s.is_self_match()) {
            if suggestion
                .upsert(&mut *tx)
                .await
                .context("Failed to upsert suggestion")?
            {
                written += 1;
            }
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn find_suggestion(&self, id: MatchId) -> Result<Option<MatchSuggestion>> {
        MatchSuggestion::find_by_id(id, &self.pool)
            .await
            .context("Failed to load suggestion")
    }

    async fn suggestions_for_requester(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>> {
        MatchSuggestion::find_for_requester(member_id, &self.pool).await
    }

    async fn suggestions_for_expert(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>> {
        MatchSuggestion::find_for_expert(member_id, &self.pool).await
    }

    async fn apply_suggestion_decision(&self, decision: &SuggestionDecision) -> Result<ApplyOutcome> {
        let mut tx = self.pool.begin().await?;

        let moved = MatchSuggestion::transition(
            decision.match_id,
            SuggestionStatus::Pending,
            decision.next,
            &mut *tx,
        )
        .await?;
        if !moved {
            tx.rollback().await?;
            return Ok(ApplyOutcome::Stale);
        }

        if let Some(chat) = &decision.chat {
            chat.insert(&mut *tx).await.context("Failed to open chat")?;
        }

        tx.commit().await.context("Failed to commit match decision")?;
        Ok(ApplyOutcome::Applied)
    }

    async fn find_chat(&self, id: ChatId) -> Result<Option<CoffeeChat>> {
        CoffeeChat::find_by_id(id, &self.pool)
            .await
            .context("Failed to load chat")
    }

    async fn load_chat_snapshot(&self, id: ChatId) -> Result<Option<ChatSnapshot>> {
        // Chat is read first: any later slot change also bumps the chat
        // version, so a torn read can only produce a plan that fails its CAS.
        let Some(chat) = CoffeeChat::find_by_id(id, &self.pool).await? else {
            return Ok(None);
        };
        let slots = ProposedSlot::find_for_chat(id, &self.pool).await?;
        let need_id = MatchSuggestion::find_by_id(chat.match_id, &self.pool)
            .await?
            .map(|s| s.need_id);

        Ok(Some(ChatSnapshot {
            chat,
            slots,
            need_id,
        }))
    }

    async fn chats_for_member(&self, member_id: MemberId) -> Result<Vec<CoffeeChat>> {
        CoffeeChat::find_for_member(member_id, &self.pool).await
    }

    async fn slots_for_chat(&self, chat_id: ChatId) -> Result<Vec<ProposedSlot>> {
        ProposedSlot::find_for_chat(chat_id, &self.pool).await
    }

    async fn apply_chat_transition(&self, transition: &ChatTransition) -> Result<ApplyOutcome> {
        let mut tx = self.pool.begin().await?;
        let chat_id = transition.chat.id;

        if !transition
            .chat
            .compare_and_set(transition.expected_version, &mut *tx)
            .await?
        {
            tx.rollback().await?;
            return Ok(ApplyOutcome::Stale);
        }

        for (slot_id, status) in &transition.slot_updates {
            ProposedSlot::update_status(*slot_id, chat_id, *status, &mut *tx).await?;
        }
        for slot in &transition.new_slots {
            slot.insert(&mut *tx).await.context("Failed to insert slot")?;
        }
        if let Some(need_id) = transition.resolve_need {
            Need::resolve(need_id, &mut *tx).await?;
        }

        tx.commit().await.context("Failed to commit chat transition")?;
        Ok(ApplyOutcome::Applied)
    }

    async fn all_needs(&self) -> Result<Vec<Need>> {
        Need::find_all(&self.pool).await.context("Failed to list needs")
    }

    async fn all_offers(&self) -> Result<Vec<Offer>> {
        Offer::find_all(&self.pool).await.context("Failed to list offers")
    }

    async fn all_suggestions(&self) -> Result<Vec<MatchSuggestion>> {
        MatchSuggestion::find_all(&self.pool)
            .await
            .context("Failed to list suggestions")
    }

    async fn all_chats(&self) -> Result<Vec<CoffeeChat>> {
        CoffeeChat::find_all(&self.pool)
            .await
            .context("Failed to list chats")
    }

    async fn stats(&self) -> Result<DashboardStats> {
        let (suggestions, pending_suggestions) = MatchSuggestion::count_by_status(&self.pool).await?;
        let (chats, confirmed_chats) = CoffeeChat::count_by_status(&self.pool).await?;

        Ok(DashboardStats {
            members: Member::count(&self.pool).await?,
            active_needs: Need::count_active(&self.pool).await?,
            active_offers: Offer::count_active(&self.pool).await?,
            suggestions,
            pending_suggestions,
            chats,
            confirmed_chats,
        })
    }
}
