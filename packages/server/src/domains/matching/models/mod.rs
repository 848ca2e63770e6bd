pub mod need;
pub mod offer;
pub mod suggestion;

pub use need::{Need, NeedStatus};
pub use offer::{Offer, OfferStatus};
pub use suggestion::{MatchSuggestion, SuggestionStatus};
