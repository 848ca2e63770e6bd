pub mod relevance;
pub mod similarity;

pub use relevance::{check_relevance_to_skills, Relevance};
pub use similarity::{
    category_bonus, cosine_similarity, reported_score, round_score, CATEGORY_BONUS,
};
