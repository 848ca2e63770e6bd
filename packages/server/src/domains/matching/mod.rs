pub mod actions;
pub mod data;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use actions::{rank, rank_pool, EmbeddingCache};
pub use data::{CheckIn, EnrichedMatch, NewNeed, NewOffer};
pub use models::{MatchSuggestion, Need, NeedStatus, Offer, OfferStatus, SuggestionStatus};
