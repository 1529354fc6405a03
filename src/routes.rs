use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{applications, auth, health, pets, shelters};
use crate::middleware::require_admin;
use crate::state::AppState;

/// Full application router over `state`
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.media.root());

    Router::new()
        .route("/health", get(health::health_get))
        .merge(auth_routes(state.clone()))
        .merge(shelter_routes())
        .merge(pet_routes())
        .merge(application_routes())
        // Uploaded pet images
        .nest_service("/uploads", uploads)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
        .route(
            "/api/auth/me",
            get(auth::me_get).route_layer(middleware::from_fn_with_state(state, require_admin)),
        )
}

fn shelter_routes() -> Router<AppState> {
    Router::new().route(
        "/api/shelters",
        get(shelters::shelters_get).post(shelters::shelters_post),
    )
}

fn pet_routes() -> Router<AppState> {
    Router::new()
        // Image uploads are not size limited
        .route(
            "/api/pets",
            get(pets::collection_get)
                .post(pets::collection_post)
                .layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/pets/:id",
            get(pets::record_get)
                .put(pets::record_put)
                .delete(pets::record_delete),
        )
}

fn application_routes() -> Router<AppState> {
    Router::new().route(
        "/api/applications",
        get(applications::applications_get).post(applications::applications_post),
    )
}
