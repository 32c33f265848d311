use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{categories, events, health_check, not_found, users};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    api_routes(state)
        .layer(create_security_headers_layer(config.is_production()))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Routes and handlers without the outer middleware stack.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(users::register))
        .route("/users/me", get(users::me))
        .route("/users/me/events", get(users::my_events))
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/categories", get(categories::list_categories))
        .route("/categories/:id", get(categories::get_category))
        .fallback(not_found)
        .with_state(state)
}
