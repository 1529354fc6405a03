// handlers/applications.rs - GET/POST /api/applications

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;

use crate::database::models::Application;
use crate::database::populate;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::state::AppState;

/// The referenced pet is not required to exist
pub async fn applications_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    let application = state
        .applications
        .create(Application::from_fields(&body)?)
        .await?;
    info!(application_id = %application.id, pet_id = %application.pet_id, "Application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

/// Lists applications with `petId` expanded; unresolved pets become null
pub async fn applications_get(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let applications = state.applications.find_all().await?;
    let expanded = populate(applications, "petId", &state.pets, |app: &Application| {
        Some(app.pet_id)
    })
    .await?;
    Ok(Json(expanded))
}
