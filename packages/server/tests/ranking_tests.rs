//! Integration tests for check-in ranking.
//!
//! Exercises the ranker through the coordinator against the in-memory store
//! and the hashing embedder.

mod common;

use crate::common::{check_in, register, TestHarness};
use match_core::domains::matching::SuggestionStatus;
use test_context::test_context;

// =============================================================================
// Scoring
// =============================================================================

/// An identical label in the same category scores similarity 1.0 plus the bonus.
#[test_context(TestHarness)]
#[tokio::test]
async fn exact_match_in_same_category_scores_highest(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;

    let exact = register(coordinator, "Grace").await;
    check_in(coordinator, exact.id, &[], &[("Cold email outreach", "sales")]).await;
    let other_category = register(coordinator, "Linus").await;
    check_in(
        coordinator,
        other_category.id,
        &[],
        &[("Cold email outreach", "marketing")],
    )
    .await;

    let requester = register(coordinator, "Ada").await;
    let outcome = check_in(coordinator, requester.id, &[("Cold email outreach", "sales")], &[]).await;

    assert_eq!(outcome.matches.len(), 2);
    let best = &outcome.matches[0];
    assert_eq!(best.suggestion.expert_id, exact.id);
    assert!((best.suggestion.score - 1.2).abs() < 1e-9);
    assert!((outcome.matches[1].suggestion.score - 1.0).abs() < 1e-9);
    assert!(best.suggestion.reason.contains("Cold email outreach"));
}

/// A member's own offer is never suggested for their own need.
#[test_context(TestHarness)]
#[tokio::test]
async fn own_offer_is_never_suggested(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;
    let member = register(coordinator, "Ada").await;

    let outcome = check_in(
        coordinator,
        member.id,
        &[("Hiring a first engineer", "hiring")],
        &[("Hiring a first engineer", "hiring")],
    )
    .await;

    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.suggestions_written, 0);
}

/// The check-in response carries at most `top_matches` suggestions, best first.
#[test_context(TestHarness)]
#[tokio::test]
async fn check_in_returns_top_matches_best_first(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;

    let labels = [
        "Pricing strategy for SaaS",
        "Enterprise sales pipeline",
        "Sales hiring plan",
        "Outbound sales playbook",
        "Closing enterprise sales deals",
    ];
    for (i, label) in labels.iter().enumerate() {
        let expert = register(coordinator, &format!("Expert {}", i)).await;
        check_in(coordinator, expert.id, &[], &[(*label, "sales")]).await;
    }

    let requester = register(coordinator, "Ada").await;
    let outcome = check_in(
        coordinator,
        requester.id,
        &[("Closing enterprise sales deals", "sales")],
        &[],
    )
    .await;

    assert_eq!(outcome.matches.len(), 3);
    let scores: Vec<f64> = outcome.matches.iter().map(|m| m.suggestion.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores not descending: {:?}", scores);
    assert!((scores[0] - 1.2).abs() < 1e-9);

    // Every match is enriched with both profiles and the need
    for m in &outcome.matches {
        assert_eq!(m.requester.as_ref().map(|r| r.id), Some(requester.id));
        assert!(m.expert.is_some());
        assert_eq!(
            m.need.as_ref().map(|n| n.label.as_str()),
            Some("Closing enterprise sales deals")
        );
    }
}

/// Scores are rounded to three decimal places.
#[test_context(TestHarness)]
#[tokio::test]
async fn scores_are_rounded_to_three_decimals(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;

    let expert = register(coordinator, "Grace").await;
    check_in(
        coordinator,
        expert.id,
        &[],
        &[("Building a design system in Figma", "UX")],
    )
    .await;
    let requester = register(coordinator, "Ada").await;
    let outcome = check_in(
        coordinator,
        requester.id,
        &[("Design system for our mobile app", "UX")],
        &[],
    )
    .await;

    for m in &outcome.matches {
        let scaled = m.suggestion.score * 1000.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "score {} not rounded", m.suggestion.score);
    }
}

// =============================================================================
// Re-ranking and persistence
// =============================================================================

/// Re-ranking the pool on later check-ins never duplicates a suggestion.
#[test_context(TestHarness)]
#[tokio::test]
async fn repeated_check_ins_do_not_duplicate_suggestions(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;

    let expert = register(coordinator, "Grace").await;
    check_in(coordinator, expert.id, &[], &[("Series A pitch deck", "fundraising")]).await;
    let requester = register(coordinator, "Ada").await;
    check_in(coordinator, requester.id, &[("Series A pitch deck", "fundraising")], &[]).await;

    // Unrelated check-ins re-rank the whole pool
    for name in ["Linus", "Barbara"] {
        let member = register(coordinator, name).await;
        check_in(coordinator, member.id, &[], &[("Kubernetes upgrades", "technical")]).await;
    }

    let matches = coordinator.matches_for_member(requester.id).await.unwrap();
    let from_expert: Vec<_> = matches
        .iter()
        .filter(|m| m.suggestion.expert_id == expert.id)
        .collect();
    assert_eq!(from_expert.len(), 1);
}

/// A declined suggestion stays declined when the pool is re-ranked.
#[test_context(TestHarness)]
#[tokio::test]
async fn declined_suggestion_is_not_revived(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;

    let expert = register(coordinator, "Grace").await;
    check_in(coordinator, expert.id, &[], &[("Series A pitch deck", "fundraising")]).await;
    let requester = register(coordinator, "Ada").await;
    let outcome =
        check_in(coordinator, requester.id, &[("Series A pitch deck", "fundraising")], &[]).await;
    let match_id = outcome.matches[0].suggestion.id;

    coordinator.decline(match_id, expert.id).await.unwrap();

    // The expert checks in again, which re-ranks everything
    check_in(coordinator, expert.id, &[], &[("Investor updates", "fundraising")]).await;

    let matches = coordinator.matches_for_member(requester.id).await.unwrap();
    let ours: Vec<_> = matches
        .iter()
        .filter(|m| m.suggestion.expert_id == expert.id)
        .collect();
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].suggestion.id, match_id);
    assert_eq!(ours[0].suggestion.status, SuggestionStatus::Declined);
}

/// Offers accumulate on the member's profile, deduplicated by label.
#[test_context(TestHarness)]
#[tokio::test]
async fn offers_accumulate_as_skills(ctx: &TestHarness) {
    let coordinator = &ctx.coordinator;
    let member = register(coordinator, "Grace").await;

    check_in(coordinator, member.id, &[], &[("SEO audits", "marketing")]).await;
    let outcome = check_in(
        coordinator,
        member.id,
        &[],
        &[("SEO audits", "marketing"), ("Brand voice", "branding")],
    )
    .await;

    let labels: Vec<&str> = outcome.member.skills.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["SEO audits", "Brand voice"]);

    let stored = coordinator.get_member(member.id).await.unwrap();
    assert_eq!(stored.skills.len(), 2);
}
