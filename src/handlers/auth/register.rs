// handlers/auth/register.rs - POST /api/auth/register handler

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use crate::database::models::NewUser;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::state::AppState;

/// Creates a shelter admin. The password is hashed before the record is
/// built, so plaintext never reaches the store.
#[instrument(skip_all)]
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new_user = NewUser::from_fields(&body)?;
    let hash = state.credentials.hash(&new_user.password).await?;

    let user = state
        .users
        .create(new_user.into_user(hash))
        .await
        .map_err(|err| match err {
            StoreError::DuplicateKey { .. } => ApiError::duplicate_key("Email already registered."),
            other => other.into(),
        })?;

    info!(user_id = %user.id, role = ?user.role, "Admin user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "userId": user.id,
        })),
    ))
}
