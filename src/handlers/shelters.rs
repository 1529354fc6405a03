// handlers/shelters.rs - GET/POST /api/shelters

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::info;

use crate::database::models::Shelter;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::state::AppState;

pub async fn shelters_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Shelter>), ApiError> {
    let shelter = state.shelters.create(Shelter::from_fields(&body)?).await?;
    info!(shelter_id = %shelter.id, "Shelter created");
    Ok((StatusCode::CREATED, Json(shelter)))
}

pub async fn shelters_get(State(state): State<AppState>) -> Result<Json<Vec<Shelter>>, ApiError> {
    Ok(Json(state.shelters.find_all().await?))
}
