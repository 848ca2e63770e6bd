//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::lifecycle::LifecycleCoordinator;
use crate::server::routes::{
    accept_match, admin_chats, admin_matches, admin_needs, admin_offers, cancel_chat,
    complete_chat, create_member, dashboard_stats, decline_match, expert_matches, get_member,
    health_handler, list_members, member_chats, member_matches, propose_slots, select_slot,
    submit_check_in, update_profile,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<LifecycleCoordinator>,
}

/// Build the Axum application router
///
/// An empty `allowed_origins` allows any origin (development).
pub fn build_app(coordinator: Arc<LifecycleCoordinator>, allowed_origins: &[String]) -> Router {
    let app_state = AppState { coordinator };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE]);

    let api = Router::new()
        .route("/members", get(list_members).post(create_member))
        .route("/members/:id", get(get_member))
        .route("/members/:id/profile", put(update_profile))
        .route("/members/:id/matches", get(member_matches))
        .route("/members/:id/expert-matches", get(expert_matches))
        .route("/members/:id/chats", get(member_chats))
        .route("/check-ins", post(submit_check_in))
        .route("/matches/:id/accept", post(accept_match))
        .route("/matches/:id/decline", post(decline_match))
        .route("/chats/:id/slots", post(propose_slots))
        .route("/chats/:id/select-slot", post(select_slot))
        .route("/chats/:id/complete", post(complete_chat))
        .route("/chats/:id/cancel", post(cancel_chat))
        .route("/stats", get(dashboard_stats))
        .route("/admin/needs", get(admin_needs))
        .route("/admin/offers", get(admin_offers))
        .route("/admin/matches", get(admin_matches))
        .route("/admin/chats", get(admin_chats));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
