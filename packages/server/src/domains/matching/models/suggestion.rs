use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{MatchId, MemberId, NeedId, OfferId};

/// Match suggestion status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "suggestion_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionStatus::Pending => write!(f, "pending"),
            SuggestionStatus::Accepted => write!(f, "accepted"),
            SuggestionStatus::Declined => write!(f, "declined"),
        }
    }
}

/// MatchSuggestion - a scored pairing of a need with a candidate expert
///
/// Invariant: `requester_id != expert_id`. Enforced by the ranker, again by
/// every store on write, and by a CHECK constraint in Postgres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchSuggestion {
    pub id: MatchId,
    pub need_id: NeedId,
    /// The offer whose label produced this score
    pub offer_id: OfferId,
    pub requester_id: MemberId,
    pub expert_id: MemberId,
    /// Rounded to 3 decimal places
    pub score: f64,
    pub reason: String,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

impl MatchSuggestion {
    pub fn is_self_match(&self) -> bool {
        self.requester_id == self.expert_id
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl MatchSuggestion {
    pub async fn find_by_id(id: MatchId, pool: &PgPool) -> Result<Option<Self>> {
        let suggestion =
            sqlx::query_as::<_, MatchSuggestion>("SELECT * FROM match_suggestions WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(suggestion)
    }

    /// Every suggestion in the pool, best first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let suggestions = sqlx::query_as::<_, MatchSuggestion>(
            "SELECT * FROM match_suggestions ORDER BY score DESC, created_at, id",
        )
        .fetch_all(pool)
        .await?;
        Ok(suggestions)
    }

    /// Suggestions where the member asked for help, best first
    pub async fn find_for_requester(member_id: MemberId, pool: &PgPool) -> Result<Vec<Self>> {
        let suggestions = sqlx::query_as::<_, MatchSuggestion>(
            "SELECT * FROM match_suggestions
             WHERE requester_id = $1
             ORDER BY score DESC, created_at, id",
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;
        Ok(suggestions)
    }

    /// Suggestions where the member is the candidate expert, best first
    pub async fn find_for_expert(member_id: MemberId, pool: &PgPool) -> Result<Vec<Self>> {
        let suggestions = sqlx::query_as::<_, MatchSuggestion>(
            "SELECT * FROM match_suggestions
             WHERE expert_id = $1
             ORDER BY score DESC, created_at, id",
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;
        Ok(suggestions)
    }

    /// Insert or refresh a suggestion keyed on (need_id, expert_id).
    ///
    /// - Skipped when the need or offer is no longer active.
    /// - An existing pending suggestion gets the new score/reason/offer.
    /// - An accepted or declined suggestion is left alone.
    ///
    /// Returns true when a row was written.
    pub async fn upsert(&self, conn: &mut PgConnection) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO match_suggestions
                (id, need_id, offer_id, requester_id, expert_id, score, reason, status, created_at)
             SELECT $1, $2, $3, $4, $5, $6, $7, 'pending', $8
             WHERE EXISTS (SELECT 1 FROM needs WHERE id = $2 AND status = 'active')
               AND EXISTS (SELECT 1 FROM offers WHERE id = $3 AND status = 'active')
             ON CONFLICT (need_id, expert_id) DO UPDATE
                SET score = EXCLUDED.score,
                    reason = EXCLUDED.reason,
                    offer_id = EXCLUDED.offer_id
                WHERE match_suggestions.status = 'pending'",
        )
        .bind(self.id)
        .bind(self.need_id)
        .bind(self.offer_id)
        .bind(self.requester_id)
        .bind(self.expert_id)
        .bind(self.score)
        .bind(&self.reason)
        .bind(self.created_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-set the status. Returns false if the row was not `expected`.
    pub async fn transition(
        id: MatchId,
        expected: SuggestionStatus,
        next: SuggestionStatus,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE match_suggestions SET status = $3 WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'pending') FROM match_suggestions",
        )
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }
}
