use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ChatId, MemberId, SlotId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "slot_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

/// ProposedSlot - one candidate meeting time offered by the expert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProposedSlot {
    pub id: SlotId,
    pub chat_id: ChatId,
    pub proposed_by: MemberId,
    pub slot_time: DateTime<Utc>,
    pub status: SlotStatus,
    /// Order within the chat (proposal order is preserved)
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl ProposedSlot {
    pub fn new(chat_id: ChatId, proposed_by: MemberId, slot_time: DateTime<Utc>, position: i32) -> Self {
        Self {
            id: SlotId::new(),
            chat_id,
            proposed_by,
            slot_time,
            status: SlotStatus::Pending,
            position,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl ProposedSlot {
    pub async fn find_for_chat(chat_id: ChatId, pool: &PgPool) -> Result<Vec<Self>> {
        let slots = sqlx::query_as::<_, ProposedSlot>(
            "SELECT * FROM proposed_slots WHERE chat_id = $1 ORDER BY position",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await?;
        Ok(slots)
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            "INSERT INTO proposed_slots (id, chat_id, proposed_by, slot_time, status, position, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(self.id)
        .bind(self.chat_id)
        .bind(self.proposed_by)
        .bind(self.slot_time)
        .bind(self.status)
        .bind(self.position)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update_status(
        id: SlotId,
        chat_id: ChatId,
        status: SlotStatus,
        conn: &mut PgConnection,
    ) -> Result<()> {
        sqlx::query("UPDATE proposed_slots SET status = $3 WHERE id = $1 AND chat_id = $2")
            .bind(id)
            .bind(chat_id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }
}
