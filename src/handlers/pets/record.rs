use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::database::models::Pet;
use crate::database::populate_one;
use crate::error::ApiError;
use crate::handlers::{parse_id, JsonBody};
use crate::state::AppState;

const NOT_FOUND: &str = "Pet not found";

/// GET /api/pets/:id - single pet with its shelter expanded
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let pet = state
        .pets
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let expanded = populate_one(pet, "shelterId", &state.shelters, |pet: &Pet| pet.shelter_id).await?;
    Ok(Json(expanded))
}

/// PUT /api/pets/:id - merge the body over the stored pet and replace it
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<Map<String, Value>>,
) -> Result<Json<Pet>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let current = state
        .pets
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    let merged = current.merged_with(&changes)?;
    let updated = state
        .pets
        .replace(merged)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    info!(pet_id = %updated.id, "Pet updated");
    Ok(Json(updated))
}

/// DELETE /api/pets/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    if !state.pets.delete(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    info!(pet_id = %id, "Pet deleted");
    Ok(Json(json!({ "message": "Pet deleted successfully." })))
}
