// Common types used across multiple domains and layers
//
// These types are shared between the kernel and domain layers to avoid
// circular dependencies while maintaining type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic category attached to needs, offers and skills.
///
/// Categories arrive already assigned by the extraction layer. Matching only
/// compares them for equality, so any non-empty token is accepted; the
/// [`Category::KNOWN`] list exists for clients that want to offer a picker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Category(String);

impl Category {
    pub const KNOWN: [&'static str; 10] = [
        "sales",
        "marketing",
        "product",
        "fundraising",
        "branding",
        "UX",
        "technical",
        "AI",
        "hiring",
        "strategy",
    ];

    /// Builds a category from untrusted input. Surrounding whitespace is
    /// dropped; an empty token is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A skill on a member's public profile, accumulated from their offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub label: String,
    pub category: Category,
}
