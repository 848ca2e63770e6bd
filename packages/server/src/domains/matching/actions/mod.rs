pub mod rank;

pub use rank::{match_reason, rank, rank_pool, EmbeddingCache, DEFAULT_MATCH_LIMIT};
