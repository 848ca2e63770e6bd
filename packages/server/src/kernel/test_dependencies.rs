// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    ActivePool, ApplyOutcome, BaseEmbeddingService, BaseMatchStore, BaseNotifier, DashboardStats,
    InMemoryStore, ServerDeps,
};
use crate::common::utils::HashingEmbedder;
use crate::common::{ChatId, MatchId, MemberId, NeedId};
use crate::domains::matching::models::{MatchSuggestion, Need, Offer};
use crate::domains::member::{Member, ProfileUpdate};
use crate::domains::scheduling::models::{CoffeeChat, ProposedSlot};
use crate::domains::scheduling::{ChatSnapshot, ChatTransition, SchedulingEvent, SuggestionDecision};

// =============================================================================
// Recording Notifier
// =============================================================================

/// Captures published events; optionally fails every publish
#[derive(Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<SchedulingEvent>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record events but report failure for each publish
    pub fn failing() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<SchedulingEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

#[async_trait]
impl BaseNotifier for RecordingNotifier {
    async fn publish(&self, event: &SchedulingEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            anyhow::bail!("notification channel unavailable");
        }
        Ok(())
    }
}

// =============================================================================
// Slow Embedder
// =============================================================================

/// Hashing embedder that sleeps before every call (for timeout tests)
pub struct SlowEmbedder {
    delay: Duration,
    inner: HashingEmbedder,
}

impl SlowEmbedder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: HashingEmbedder::default(),
        }
    }
}

#[async_trait]
impl BaseEmbeddingService for SlowEmbedder {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.inner.embed(text))
    }
}

// =============================================================================
// Faulty Store
// =============================================================================

/// In-memory store whose transition writes fail before touching any state
pub struct FaultyStore {
    inner: Arc<InMemoryStore>,
}

impl FaultyStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<InMemoryStore> {
        &self.inner
    }
}

#[async_trait]
impl BaseMatchStore for FaultyStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        self.inner.insert_member(member).await
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        self.inner.find_member(id).await
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        self.inner.list_members().await
    }

    async fn update_member_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Option<Member>> {
        self.inner.update_member_profile(id, update).await
    }

    async fn record_check_in(
        &self,
        member_id: MemberId,
        needs: &[Need],
        offers: &[Offer],
    ) -> Result<Option<Member>> {
        self.inner.record_check_in(member_id, needs, offers).await
    }

    async fn find_need(&self, id: NeedId) -> Result<Option<Need>> {
        self.inner.find_need(id).await
    }

    async fn active_pool(&self) -> Result<ActivePool> {
        self.inner.active_pool().await
    }

    async fn upsert_suggestions(&self, suggestions: &[MatchSuggestion]) -> Result<usize> {
        self.inner.upsert_suggestions(suggestions).await
    }

    async fn find_suggestion(&self, id: MatchId) -> Result<Option<MatchSuggestion>> {
        self.inner.find_suggestion(id).await
    }

    async fn suggestions_for_requester(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>> {
        self.inner.suggestions_for_requester(member_id).await
    }

    async fn suggestions_for_expert(&self, member_id: MemberId) -> Result<Vec<MatchSuggestion>> {
        self.inner.suggestions_for_expert(member_id).await
    }

    async fn apply_suggestion_decision(&self, decision: &SuggestionDecision) -> Result<ApplyOutcome> {
        let _ = decision;
        anyhow::bail!("connection reset while applying match decision")
    }

    async fn find_chat(&self, id: ChatId) -> Result<Option<CoffeeChat>> {
        self.inner.find_chat(id).await
    }

    async fn load_chat_snapshot(&self, id: ChatId) -> Result<Option<ChatSnapshot>> {
        self.inner.load_chat_snapshot(id).await
    }

    async fn chats_for_member(&self, member_id: MemberId) -> Result<Vec<CoffeeChat>> {
        self.inner.chats_for_member(member_id).await
    }

    async fn slots_for_chat(&self, chat_id: ChatId) -> Result<Vec<ProposedSlot>> {
        self.inner.slots_for_chat(chat_id).await
    }

    async fn apply_chat_transition(&self, transition: &ChatTransition) -> Result<ApplyOutcome> {
        let _ = transition;
        anyhow::bail!("connection reset while applying chat transition")
    }

    async fn all_needs(&self) -> Result<Vec<Need>> {
        self.inner.all_needs().await
    }

    async fn all_offers(&self) -> Result<Vec<Offer>> {
        self.inner.all_offers().await
    }

    async fn all_suggestions(&self) -> Result<Vec<MatchSuggestion>> {
        self.inner.all_suggestions().await
    }

    async fn all_chats(&self) -> Result<Vec<CoffeeChat>> {
        self.inner.all_chats().await
    }

    async fn stats(&self) -> Result<DashboardStats> {
        self.inner.stats().await
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<dyn BaseMatchStore>,
    pub embedding_service: Arc<dyn BaseEmbeddingService>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            embedding_service: Arc::new(HashingEmbedder::default()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    /// Set the store
    pub fn store(mut self, store: Arc<dyn BaseMatchStore>) -> Self {
        self.store = store;
        self
    }

    /// Set the embedding service
    pub fn embeddings(mut self, service: Arc<dyn BaseEmbeddingService>) -> Self {
        self.embedding_service = service;
        self
    }

    /// Set the notifier
    pub fn notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn into_server_deps(self) -> ServerDeps {
        ServerDeps::new(self.store, self.embedding_service, self.notifier)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
