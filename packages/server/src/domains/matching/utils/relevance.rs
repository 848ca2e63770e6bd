//! Pure utility functions for filtering an expert's inbox
//!
//! An expert only sees suggestions for needs that touch their skill profile.

use std::collections::HashSet;

use crate::common::utils::label_tokens;
use crate::common::Skill;

/// Why a need was judged relevant to a skill profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance {
    /// A skill shares the need's category (case-insensitive)
    Category,
    /// A skill label shares at least one word with the need label
    SharedWord(String),
    NotRelevant,
}

impl Relevance {
    pub fn is_relevant(&self) -> bool {
        !matches!(self, Relevance::NotRelevant)
    }
}

/// Check whether a need is relevant to an expert's skills.
///
/// Algorithm:
/// - category match against any skill -> relevant
/// - any word of any skill label appearing in the need label -> relevant
/// - otherwise not relevant (an empty profile is never relevant)
pub fn check_relevance_to_skills(need_label: &str, need_category: &str, skills: &[Skill]) -> Relevance {
    let need_category = need_category.to_lowercase();
    if skills
        .iter()
        .any(|s| s.category.as_str().to_lowercase() == need_category)
    {
        return Relevance::Category;
    }

    let need_words: HashSet<String> = label_tokens(need_label).into_iter().collect();
    for skill in skills {
        if let Some(word) = label_tokens(&skill.label)
            .into_iter()
            .find(|w| need_words.contains(w))
        {
            return Relevance::SharedWord(word);
        }
    }

    Relevance::NotRelevant
}
