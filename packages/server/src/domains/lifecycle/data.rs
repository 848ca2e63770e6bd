use serde::Serialize;

use crate::domains::matching::{EnrichedMatch, Need, Offer};
use crate::domains::member::Member;
use crate::domains::scheduling::models::{CoffeeChat, ProposedSlot};

/// What a member gets back after checking in
#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub member: Member,
    pub needs: Vec<Need>,
    pub offers: Vec<Offer>,
    /// Suggestions inserted or refreshed across the whole pool
    pub suggestions_written: usize,
    /// The member's best pending suggestions
    pub matches: Vec<EnrichedMatch>,
}

/// A chat with both participants and its slots, in proposal order
#[derive(Debug, Clone, Serialize)]
pub struct ChatDetails {
    #[serde(flatten)]
    pub chat: CoffeeChat,
    pub requester: Option<Member>,
    pub expert: Option<Member>,
    pub slots: Vec<ProposedSlot>,
}

/// Admin view of a need
#[derive(Debug, Clone, Serialize)]
pub struct OwnedNeed {
    #[serde(flatten)]
    pub need: Need,
    pub member: Option<Member>,
}

/// Admin view of an offer
#[derive(Debug, Clone, Serialize)]
pub struct OwnedOffer {
    #[serde(flatten)]
    pub offer: Offer,
    pub member: Option<Member>,
}
