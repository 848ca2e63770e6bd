//! Typed ids for every stored entity.

use super::id::Id;

/// Marker types. Never constructed; they only tag an [`Id`].
pub mod markers {
    /// A founder with a public profile
    pub struct Member;
    /// A request for help
    pub struct Need;
    /// Something a member can share
    pub struct Offer;
    pub struct MatchSuggestion;
    pub struct CoffeeChat;
    pub struct ProposedSlot;
}

pub type MemberId = Id<markers::Member>;
pub type NeedId = Id<markers::Need>;
pub type OfferId = Id<markers::Offer>;
pub type MatchId = Id<markers::MatchSuggestion>;
pub type ChatId = Id<markers::CoffeeChat>;
pub type SlotId = Id<markers::ProposedSlot>;
