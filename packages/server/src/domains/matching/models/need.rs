use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{Category, MemberId, NeedId};

/// Need status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "need_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NeedStatus {
    #[default]
    Active,
    Resolved,
}

/// Need - something a member asked for help with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Need {
    pub id: NeedId,
    pub requester_id: MemberId,
    pub label: String,
    pub category: Category,
    pub status: NeedStatus,
    pub created_at: DateTime<Utc>,
}

impl Need {
    pub fn new(requester_id: MemberId, label: impl Into<String>, category: Category) -> Self {
        Self {
            id: NeedId::new(),
            requester_id,
            label: label.into(),
            category,
            status: NeedStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == NeedStatus::Active
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Need {
    pub async fn find_by_id(id: NeedId, pool: &PgPool) -> Result<Option<Self>> {
        let need = sqlx::query_as::<_, Need>("SELECT * FROM needs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(need)
    }

    /// All active needs, oldest first (ranking order is derived from this)
    pub async fn find_active(conn: &mut PgConnection) -> Result<Vec<Self>> {
        let needs = sqlx::query_as::<_, Need>(
            "SELECT * FROM needs WHERE status = 'active' ORDER BY created_at, id",
        )
        .fetch_all(conn)
        .await?;
        Ok(needs)
    }

    /// Every need regardless of status, newest first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let needs =
            sqlx::query_as::<_, Need>("SELECT * FROM needs ORDER BY created_at DESC, id")
                .fetch_all(pool)
                .await?;
        Ok(needs)
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            "INSERT INTO needs (id, requester_id, label, category, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(self.id)
        .bind(self.requester_id)
        .bind(&self.label)
        .bind(&self.category)
        .bind(self.status)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn resolve(id: NeedId, conn: &mut PgConnection) -> Result<()> {
        sqlx::query("UPDATE needs SET status = 'resolved' WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn count_active(pool: &PgPool) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM needs WHERE status = 'active'")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }
}
