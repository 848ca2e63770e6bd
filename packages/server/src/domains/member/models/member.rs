use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::common::{MatchError, MatchResult, MemberId, Skill};

/// Member - a founder's public profile
///
/// Privacy: no email or credentials live here. This is the record other
/// members see when a match is surfaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub company: String,
    pub role: String,
    pub bio: String,
    /// Skills accumulated from the member's offers (deduplicated by label)
    pub skills: Vec<Skill>,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub bio: String,
}

fn default_role() -> String {
    "founder".to_string()
}

impl NewMember {
    pub fn validate(&self) -> MatchResult<()> {
        if self.name.trim().is_empty() {
            return Err(MatchError::Validation("member name is required".into()));
        }
        Ok(())
    }

    pub fn into_member(self) -> Member {
        Member {
            id: MemberId::new(),
            name: self.name.trim().to_string(),
            company: self.company.trim().to_string(),
            role: self.role.trim().to_string(),
            bio: self.bio,
            skills: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Profile edit payload. Absent fields are left unchanged; skills only
/// change through check-ins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> MatchResult<()> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(MatchError::Validation("member name cannot be blank".into()));
        }
        if self.name.is_none() && self.company.is_none() && self.role.is_none() && self.bio.is_none()
        {
            return Err(MatchError::Validation("profile update has no fields".into()));
        }
        Ok(())
    }
}

impl Member {
    pub fn apply_profile(&mut self, update: &ProfileUpdate) {
        if let Some(name) = update.name.as_deref() {
            self.name = name.trim().to_string();
        }
        if let Some(company) = update.company.as_deref() {
            self.company = company.trim().to_string();
        }
        if let Some(role) = update.role.as_deref() {
            self.role = role.trim().to_string();
        }
        if let Some(bio) = &update.bio {
            self.bio = bio.clone();
        }
    }

    /// Add skills not already on the profile. Labels are compared exactly.
    ///
    /// Returns how many skills were added.
    pub fn merge_skills(&mut self, skills: &[Skill]) -> usize {
        let mut added = 0;
        for skill in skills {
            if !self.skills.iter().any(|s| s.label == skill.label) {
                self.skills.push(skill.clone());
                added += 1;
            }
        }
        added
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: MemberId,
    name: String,
    company: String,
    role: String,
    bio: String,
    skills: Json<Vec<Skill>>,
    created_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company: row.company,
            role: row.role,
            bio: row.bio,
            skills: row.skills.0,
            created_at: row.created_at,
        }
    }
}

impl Member {
    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Registration order
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let rows =
            sqlx::query_as::<_, MemberRow>("SELECT * FROM members ORDER BY created_at, id")
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO members (id, name, company, role, bio, skills, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.company)
        .bind(&self.role)
        .bind(&self.bio)
        .bind(Json(&self.skills))
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Merge skills under a row lock (call inside a transaction)
    pub async fn merge_skills_locked(
        id: MemberId,
        skills: &[Skill],
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut member = Member::from(row);
        if member.merge_skills(skills) > 0 {
            sqlx::query("UPDATE members SET skills = $2 WHERE id = $1")
                .bind(id)
                .bind(Json(&member.skills))
                .execute(&mut *conn)
                .await?;
        }

        Ok(Some(member))
    }

    /// Overwrite the editable profile columns
    pub async fn save_profile(&self, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE members SET name = $2, company = $3, role = $4, bio = $5 WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.company)
        .bind(&self.role)
        .bind(&self.bio)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }
}
