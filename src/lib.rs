use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod ckan;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;
pub mod stories;

use ckan::EntityKind;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness + endpoint index
        .route("/health", get(health))
        .route("/api", get(api_index))
        // API route groups
        .merge(auth_routes())
        .merge(user_routes())
        .merge(story_routes())
        .merge(handlers::entities::routes(EntityKind::Organization))
        .merge(handlers::entities::routes(EntityKind::Group))
        // Gate redirect targets
        .merge(page_routes())
        // Global middleware
        .layer(axum::middleware::from_fn(middleware::gate::session_gate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<Arc<AppState>> {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
}

fn user_routes() -> Router<Arc<AppState>> {
    use axum::routing::{delete, patch, post};
    use handlers::users;

    Router::new()
        .route("/api/users/list", get(users::list))
        .route("/api/users/show", get(users::show))
        .route("/api/users/create", post(users::create))
        .route("/api/users/update", patch(users::update))
        .route("/api/users/delete", delete(users::delete))
}

fn story_routes() -> Router<Arc<AppState>> {
    use axum::routing::{delete, post, put};
    use handlers::stories;

    Router::new()
        .route("/api/stories/create", post(stories::create))
        .route("/api/stories/get", get(stories::get))
        .route("/api/stories/list", get(stories::list))
        .route("/api/stories/update", put(stories::update))
        .route("/api/stories/delete", delete(stories::delete))
}

fn page_routes() -> Router<Arc<AppState>> {
    use handlers::pages;

    Router::new()
        .route("/login", get(pages::login_page))
        .route("/dashboard", get(pages::dashboard_page))
}

async fn api_index() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Portal Admin API",
            "version": version,
            "description": "Admin console backend for a CKAN-based data portal",
            "endpoints": {
                "auth": "/api/auth/login, /api/auth/me",
                "users": "/api/users/{list,show,create,update,delete}",
                "organizations": "/api/organizations/{list,show,create,update,delete}",
                "groups": "/api/groups/{list,show,create,update,delete}",
                "stories": "/api/stories/{list,get,create,update,delete}",
                "pages": "/login, /dashboard",
            }
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.stories.check_root().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "stories": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "story store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "stories_error": e.to_string()
                }
            })),
        ),
    }
}
