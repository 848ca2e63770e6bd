//! Match ranking
//!
//! For one need: score every eligible offer, add the category bonus, sort
//! best first and keep the top `limit`. A pass over the whole pool shares one
//! [`EmbeddingCache`] so every distinct label is embedded once.

use anyhow::Result;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::common::{MatchId, MemberId};
use crate::domains::matching::models::{MatchSuggestion, Need, Offer, SuggestionStatus};
use crate::domains::matching::utils::{category_bonus, cosine_similarity, reported_score};
use crate::kernel::BaseEmbeddingService;

pub const DEFAULT_MATCH_LIMIT: usize = 3;

/// Per-pass memo of label embeddings. Dropped with the pass.
pub struct EmbeddingCache {
    service: Arc<dyn BaseEmbeddingService>,
    vectors: HashMap<String, Arc<[f32]>>,
}

impl EmbeddingCache {
    pub fn new(service: Arc<dyn BaseEmbeddingService>) -> Self {
        Self {
            service,
            vectors: HashMap::new(),
        }
    }

    pub async fn embed(&mut self, label: &str) -> Result<Arc<[f32]>> {
        if let Some(vector) = self.vectors.get(label) {
            return Ok(vector.clone());
        }

        let vector: Arc<[f32]> = self.service.generate(label).await?.into();
        self.vectors.insert(label.to_string(), vector.clone());
        Ok(vector)
    }

    /// Number of distinct labels embedded so far
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Human-readable explanation shown next to a suggestion
pub fn match_reason(need: &Need, offer: &Offer) -> String {
    if need.category == offer.category {
        format!(
            "Both focus on {}. The expert's experience with '{}' directly addresses your need for '{}'",
            need.category, offer.label, need.label
        )
    } else {
        format!(
            "The expert's experience with '{}' can help with your need for '{}'",
            offer.label, need.label
        )
    }
}

/// Rank offers for a single need.
///
/// - Offers owned by the requester are never suggested.
/// - Ties keep input order (stable sort on the unrounded score).
/// - Each expert appears at most once, through their best-scoring offer.
/// - Emitted scores are rounded to 3 decimals (see [`reported_score`]).
pub async fn rank(
    need: &Need,
    offers: &[Offer],
    limit: usize,
    cache: &mut EmbeddingCache,
) -> Result<Vec<MatchSuggestion>> {
    let need_vector = cache.embed(&need.label).await?;

    let mut scored: Vec<(f64, f64, &Offer)> = Vec::with_capacity(offers.len());
    for offer in offers {
        if offer.owner_id == need.requester_id || !offer.is_active() {
            continue;
        }
        let offer_vector = cache.embed(&offer.label).await?;
        let similarity = cosine_similarity(&need_vector, &offer_vector);
        let score = similarity + category_bonus(need.category == offer.category);
        scored.push((score, similarity, offer));
    }

    // Vec::sort_by is stable
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut seen_experts: HashSet<MemberId> = HashSet::new();
    let suggestions: Vec<MatchSuggestion> = scored
        .into_iter()
        .filter(|(_, _, offer)| seen_experts.insert(offer.owner_id))
        .take(limit)
        .map(|(_, similarity, offer)| MatchSuggestion {
            id: MatchId::new(),
            need_id: need.id,
            offer_id: offer.id,
            requester_id: need.requester_id,
            expert_id: offer.owner_id,
            score: reported_score(similarity, need.category == offer.category),
            reason: match_reason(need, offer),
            status: SuggestionStatus::Pending,
            created_at: Utc::now(),
        })
        .collect();

    debug!(
        need_id = %need.id,
        candidates = offers.len(),
        kept = suggestions.len(),
        "Ranked offers for need"
    );

    Ok(suggestions)
}

/// Rank every active need in the pool against every active offer
pub async fn rank_pool(
    needs: &[Need],
    offers: &[Offer],
    limit: usize,
    cache: &mut EmbeddingCache,
) -> Result<Vec<MatchSuggestion>> {
    let mut all = Vec::new();
    for need in needs.iter().filter(|n| n.is_active()) {
        all.extend(rank(need, offers, limit, cache).await?);
    }

    debug!(
        needs = needs.len(),
        offers = offers.len(),
        suggestions = all.len(),
        labels_embedded = cache.len(),
        "Ranking pass complete"
    );

    Ok(all)
}
