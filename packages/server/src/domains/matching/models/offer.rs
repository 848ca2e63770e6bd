use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{Category, MemberId, OfferId, Skill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Active,
}

/// Offer - a skill or learning a member can share with others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: OfferId,
    pub owner_id: MemberId,
    pub label: String,
    pub category: Category,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(owner_id: MemberId, label: impl Into<String>, category: Category) -> Self {
        Self {
            id: OfferId::new(),
            owner_id,
            label: label.into(),
            category,
            status: OfferStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == OfferStatus::Active
    }

    pub fn as_skill(&self) -> Skill {
        Skill {
            label: self.label.clone(),
            category: self.category.clone(),
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Offer {
    pub async fn find_active(conn: &mut PgConnection) -> Result<Vec<Self>> {
        let offers = sqlx::query_as::<_, Offer>(
            "SELECT * FROM offers WHERE status = 'active' ORDER BY created_at, id",
        )
        .fetch_all(conn)
        .await?;
        Ok(offers)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let offers =
            sqlx::query_as::<_, Offer>("SELECT * FROM offers ORDER BY created_at DESC, id")
                .fetch_all(pool)
                .await?;
        Ok(offers)
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            "INSERT INTO offers (id, owner_id, label, category, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(self.id)
        .bind(self.owner_id)
        .bind(&self.label)
        .bind(&self.category)
        .bind(self.status)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn count_active(pool: &PgPool) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM offers WHERE status = 'active'")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }
}
