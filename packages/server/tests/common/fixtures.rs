//! Test fixtures for creating members, check-ins and chats through the coordinator.

use chrono::{DateTime, Duration, TimeZone, Utc};

use match_core::common::MemberId;
use match_core::domains::lifecycle::{ChatDetails, CheckInOutcome, LifecycleCoordinator};
use match_core::domains::matching::{CheckIn, EnrichedMatch, NewNeed, NewOffer};
use match_core::domains::member::{Member, NewMember};

pub async fn register(coordinator: &LifecycleCoordinator, name: &str) -> Member {
    coordinator
        .register_member(NewMember {
            name: name.to_string(),
            company: format!("{} Labs", name),
            role: "founder".to_string(),
            bio: String::new(),
        })
        .await
        .expect("Failed to register member")
}

pub fn check_in_payload(
    member_id: MemberId,
    needs: &[(&str, &str)],
    offers: &[(&str, &str)],
) -> CheckIn {
    CheckIn {
        member_id,
        needs: needs
            .iter()
            .map(|(label, category)| NewNeed {
                label: label.to_string(),
                category: category.to_string(),
            })
            .collect(),
        offers: offers
            .iter()
            .map(|(label, category)| NewOffer {
                label: label.to_string(),
                category: category.to_string(),
            })
            .collect(),
    }
}

pub async fn check_in(
    coordinator: &LifecycleCoordinator,
    member_id: MemberId,
    needs: &[(&str, &str)],
    offers: &[(&str, &str)],
) -> CheckInOutcome {
    coordinator
        .submit_check_in(check_in_payload(member_id, needs, offers))
        .await
        .expect("Failed to submit check-in")
}

/// A requester who needs help with fundraising and an expert who offers it.
///
/// The expert checks in first so the requester's check-in produces the match.
/// The label carries a per-pair tag so the pair's exact match outranks
/// experts left in a shared store by earlier tests.
pub struct MatchedPair {
    pub requester: Member,
    pub expert: Member,
    pub suggestion: EnrichedMatch,
}

pub async fn matched_pair(coordinator: &LifecycleCoordinator) -> MatchedPair {
    let expert = register(coordinator, "Grace").await;
    let label = format!("Raising a seed round {}", &expert.id.to_string()[24..]);
    check_in(coordinator, expert.id, &[], &[(label.as_str(), "fundraising")]).await;

    let requester = register(coordinator, "Ada").await;
    check_in(
        coordinator,
        requester.id,
        &[(label.as_str(), "fundraising")],
        &[],
    )
    .await;

    // Other experts may already be in the pool; pick the one created here
    let suggestion = coordinator
        .matches_for_member(requester.id)
        .await
        .expect("Failed to list matches")
        .into_iter()
        .find(|m| m.suggestion.expert_id == expert.id)
        .expect("Requester should be matched with the expert");

    MatchedPair {
        requester,
        expert,
        suggestion,
    }
}

/// Matched pair whose suggestion the expert has accepted
pub async fn open_chat(coordinator: &LifecycleCoordinator) -> (MatchedPair, ChatDetails) {
    let pair = matched_pair(coordinator).await;
    let chat = coordinator
        .accept(pair.suggestion.suggestion.id, pair.expert.id)
        .await
        .expect("Failed to accept match");
    (pair, chat)
}

/// `count` distinct slot times one hour apart
pub fn slot_times(count: usize) -> Vec<DateTime<Utc>> {
    let start = Utc
        .with_ymd_and_hms(2030, 3, 4, 15, 0, 0)
        .single()
        .expect("valid timestamp");
    (0..count)
        .map(|i| start + Duration::hours(i as i64))
        .collect()
}
