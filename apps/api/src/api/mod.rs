// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::TeamService;
use handlers::teams;

/// Builds the HTTP router over a team service
pub fn router(service: TeamService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(teams::health_check))
        // Team routes
        .route("/api/teams", post(teams::create_team))
        .route(
            "/api/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        // Membership routes
        .route(
            "/api/teams/:id/members",
            post(teams::add_team_member).get(teams::get_team_members),
        )
        .route(
            "/api/teams/:id/members/:user_id",
            axum::routing::delete(teams::remove_team_member),
        )
        .route(
            "/api/teams/:id/members/:user_id/roles",
            put(teams::update_team_member_roles),
        )
        .route(
            "/api/teams/:id/members/:user_id/schemeRoles",
            put(teams::update_team_member_scheme_roles),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(service)
}
