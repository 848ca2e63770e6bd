use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ChatId, MatchId, MemberId};
use crate::domains::matching::models::MatchSuggestion;

/// Coffee chat status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "chat_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    /// Accepted, waiting for the expert to propose times
    #[default]
    PendingSlots,
    /// Times proposed, waiting for the requester to pick one
    PendingConfirmation,
    Confirmed,
    Completed,
    Cancelled,
}

impl ChatStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatStatus::Completed | ChatStatus::Cancelled)
    }
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatStatus::PendingSlots => write!(f, "pending_slots"),
            ChatStatus::PendingConfirmation => write!(f, "pending_confirmation"),
            ChatStatus::Confirmed => write!(f, "confirmed"),
            ChatStatus::Completed => write!(f, "completed"),
            ChatStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// CoffeeChat - the scheduling session opened when a match is accepted
///
/// `version` increments on every transition and is the compare-and-set key
/// stores use to reject writes computed from a stale snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoffeeChat {
    pub id: ChatId,
    pub match_id: MatchId,
    pub requester_id: MemberId,
    pub expert_id: MemberId,
    pub status: ChatStatus,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl CoffeeChat {
    /// Open a chat for an accepted suggestion
    pub fn open(suggestion: &MatchSuggestion) -> Self {
        Self {
            id: ChatId::new(),
            match_id: suggestion.id,
            requester_id: suggestion.requester_id,
            expert_id: suggestion.expert_id,
            status: ChatStatus::PendingSlots,
            scheduled_time: None,
            meeting_link: None,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_participant(&self, member_id: MemberId) -> bool {
        self.requester_id == member_id || self.expert_id == member_id
    }

    /// Meeting room URL for a chat.
    ///
    /// Derived from the chat id alone, so anyone who knows the id can join.
    /// Not an access-control boundary.
    pub fn meeting_link_for(base_url: &str, chat_id: ChatId) -> String {
        format!("{}/FounderChat-{}", base_url.trim_end_matches('/'), chat_id)
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl CoffeeChat {
    pub async fn find_by_id(id: ChatId, pool: &PgPool) -> Result<Option<Self>> {
        let chat = sqlx::query_as::<_, CoffeeChat>("SELECT * FROM coffee_chats WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(chat)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let chats = sqlx::query_as::<_, CoffeeChat>(
            "SELECT * FROM coffee_chats ORDER BY created_at DESC, id",
        )
        .fetch_all(pool)
        .await?;
        Ok(chats)
    }

    pub async fn find_for_member(member_id: MemberId, pool: &PgPool) -> Result<Vec<Self>> {
        let chats = sqlx::query_as::<_, CoffeeChat>(
            "SELECT * FROM coffee_chats
             WHERE requester_id = $1 OR expert_id = $1
             ORDER BY created_at DESC, id",
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;
        Ok(chats)
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            "INSERT INTO coffee_chats
                (id, match_id, requester_id, expert_id, status, scheduled_time, meeting_link, version, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(self.id)
        .bind(self.match_id)
        .bind(self.requester_id)
        .bind(self.expert_id)
        .bind(self.status)
        .bind(self.scheduled_time)
        .bind(&self.meeting_link)
        .bind(self.version)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Write `self` over the stored row if the stored version is `expected_version`.
    pub async fn compare_and_set(&self, expected_version: i32, conn: &mut PgConnection) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE coffee_chats
             SET status = $3, scheduled_time = $4, meeting_link = $5, version = $6
             WHERE id = $1 AND version = $2",
        )
        .bind(self.id)
        .bind(expected_version)
        .bind(self.status)
        .bind(self.scheduled_time)
        .bind(&self.meeting_link)
        .bind(self.version)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'confirmed') FROM coffee_chats",
        )
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ChatStatus::Completed.is_terminal());
        assert!(ChatStatus::Cancelled.is_terminal());
        assert!(!ChatStatus::PendingSlots.is_terminal());
        assert!(!ChatStatus::PendingConfirmation.is_terminal());
        assert!(!ChatStatus::Confirmed.is_terminal());
    }

    #[test]
    fn test_meeting_link_is_deterministic() {
        let chat_id = ChatId::new();
        let a = CoffeeChat::meeting_link_for("https://meet.jit.si", chat_id);
        let b = CoffeeChat::meeting_link_for("https://meet.jit.si/", chat_id);
        assert_eq!(a, b);
        assert_eq!(a, format!("https://meet.jit.si/FounderChat-{}", chat_id));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ChatStatus::PendingConfirmation).unwrap();
        assert_eq!(json, "\"pending_confirmation\"");
        assert_eq!(ChatStatus::PendingSlots.to_string(), "pending_slots");
    }
}
