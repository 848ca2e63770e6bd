//! Integration tests for the HTTP API.
//!
//! Drives the Axum router in-process with `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{matched_pair, open_chat, slot_times, TestHarness};
use test_context::test_context;

async fn send(ctx: &TestHarness, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = ctx.app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

// =============================================================================
// Health
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_store_ok(ctx: &TestHarness) {
    let (status, body) = send(ctx, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["status"], "ok");
}

// =============================================================================
// Members and check-ins
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_member_and_check_in(ctx: &TestHarness) {
    let (status, expert) = send(
        ctx,
        "POST",
        "/api/members",
        Some(json!({"name": "Grace", "company": "Compilers Inc"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expert["role"], "founder");
    let expert_id = expert["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        ctx,
        "POST",
        "/api/check-ins",
        Some(json!({
            "member_id": expert_id,
            "offers": [{"label": "Raising a seed round", "category": "fundraising"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, requester) = send(ctx, "POST", "/api/members", Some(json!({"name": "Ada"}))).await;
    let requester_id = requester["id"].as_str().unwrap().to_string();

    let (status, outcome) = send(
        ctx,
        "POST",
        "/api/check-ins",
        Some(json!({
            "member_id": requester_id,
            "needs": [{"label": "Raising a seed round", "category": "fundraising"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let matches = outcome["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    // Suggestion fields are flattened next to the enriched records
    assert_eq!(matches[0]["expert_id"], expert_id.as_str());
    assert_eq!(matches[0]["status"], "pending");
    assert_eq!(matches[0]["expert"]["name"], "Grace");
    assert_eq!(matches[0]["need"]["label"], "Raising a seed round");

    let (status, fetched) = send(ctx, "GET", &format!("/api/members/{}", expert_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["skills"][0]["label"], "Raising a seed round");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_member_is_404(ctx: &TestHarness) {
    let uri = format!("/api/members/{}", uuid::Uuid::new_v4());
    let (status, body) = send(ctx, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invalid_check_in_is_422(ctx: &TestHarness) {
    let (_, member) = send(ctx, "POST", "/api/members", Some(json!({"name": "Ada"}))).await;

    let (status, body) = send(
        ctx,
        "POST",
        "/api/check-ins",
        Some(json!({"member_id": member["id"].clone(), "needs": [], "offers": []})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");
}

// =============================================================================
// Matches and chats
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn wrong_actor_is_403(ctx: &TestHarness) {
    let pair = matched_pair(&ctx.coordinator).await;
    let uri = format!("/api/matches/{}/accept", pair.suggestion.suggestion.id);

    let (status, body) = send(ctx, "POST", &uri, Some(json!({"actor_id": pair.requester.id}))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "unauthorized");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn repeated_decision_is_409(ctx: &TestHarness) {
    let pair = matched_pair(&ctx.coordinator).await;
    let accept = format!("/api/matches/{}/accept", pair.suggestion.suggestion.id);
    let decline = format!("/api/matches/{}/decline", pair.suggestion.suggestion.id);
    let actor = json!({"actor_id": pair.expert.id});

    let (status, chat) = send(ctx, "POST", &accept, Some(actor.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["status"], "pending_slots");

    let (status, body) = send(ctx, "POST", &decline, Some(actor)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "invalid_transition");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn schedule_over_http(ctx: &TestHarness) {
    let (pair, chat) = open_chat(&ctx.coordinator).await;
    let chat_id = chat.chat.id;

    let (status, proposed) = send(
        ctx,
        "POST",
        &format!("/api/chats/{}/slots", chat_id),
        Some(json!({"actor_id": pair.expert.id, "slots": slot_times(2)})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proposed["status"], "pending_confirmation");
    let slot_id = proposed["slots"][1]["id"].clone();

    let (status, confirmed) = send(
        ctx,
        "POST",
        &format!("/api/chats/{}/select-slot", chat_id),
        Some(json!({"actor_id": pair.requester.id, "slot_id": slot_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");
    assert!(confirmed["meeting_link"].as_str().unwrap().contains("FounderChat-"));

    let (status, chats) = send(
        ctx,
        "GET",
        &format!("/api/members/{}/chats", pair.requester.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chats.as_array().unwrap().len(), 1);

    let (status, stats) = send(ctx, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["confirmed_chats"], 1);
}

// =============================================================================
// Profiles and admin listings
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn list_members_and_edit_own_profile(ctx: &TestHarness) {
    let (_, ada) = send(ctx, "POST", "/api/members", Some(json!({"name": "Ada"}))).await;
    let (_, grace) = send(ctx, "POST", "/api/members", Some(json!({"name": "Grace"}))).await;

    let (status, members) = send(ctx, "GET", "/api/members", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = members
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ada", "Grace"]);

    let profile_uri = format!("/api/members/{}/profile", ada["id"].as_str().unwrap());
    let (status, updated) = send(
        ctx,
        "PUT",
        &profile_uri,
        Some(json!({"actor_id": ada["id"], "bio": "Second-time founder", "company": "Engines Ltd"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "Second-time founder");
    assert_eq!(updated["company"], "Engines Ltd");
    assert_eq!(updated["name"], "Ada");

    let (status, body) = send(
        ctx,
        "PUT",
        &profile_uri,
        Some(json!({"actor_id": grace["id"], "bio": "Not mine to write"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "unauthorized");

    let (status, _) = send(ctx, "PUT", &profile_uri, Some(json!({"actor_id": ada["id"]}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, fetched) = send(ctx, "GET", &format!("/api/members/{}", ada["id"].as_str().unwrap()), None).await;
    assert_eq!(fetched["bio"], "Second-time founder");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn profile_update_for_unknown_member_is_404(ctx: &TestHarness) {
    let id = uuid::Uuid::new_v4();
    let (status, body) = send(
        ctx,
        "PUT",
        &format!("/api/members/{}/profile", id),
        Some(json!({"actor_id": id, "bio": "Ghost"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn admin_listings_span_all_members(ctx: &TestHarness) {
    let (pair, chat) = open_chat(&ctx.coordinator).await;

    let (status, needs) = send(ctx, "GET", "/api/admin/needs", None).await;
    assert_eq!(status, StatusCode::OK);
    let needs = needs.as_array().unwrap();
    assert_eq!(needs.len(), 1);
    assert_eq!(needs[0]["requester_id"], json!(pair.requester.id));
    assert_eq!(needs[0]["member"]["name"], "Ada");

    let (status, offers) = send(ctx, "GET", "/api/admin/offers", None).await;
    assert_eq!(status, StatusCode::OK);
    let offers = offers.as_array().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0]["member"]["name"], "Grace");

    let (status, matches) = send(ctx, "GET", "/api/admin/matches", None).await;
    assert_eq!(status, StatusCode::OK);
    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 1);
    // Accepted suggestions stay listed
    assert_eq!(matches[0]["status"], "accepted");
    assert_eq!(matches[0]["expert"]["name"], "Grace");

    let (status, chats) = send(ctx, "GET", "/api/admin/chats", None).await;
    assert_eq!(status, StatusCode::OK);
    let chats = chats.as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["id"], json!(chat.chat.id));
    assert_eq!(chats[0]["status"], "pending_slots");
}
