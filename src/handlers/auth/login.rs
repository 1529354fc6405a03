// handlers/auth/login.rs - POST /api/auth/login handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::database::models::Role;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::handlers::JsonBody;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// Exchanges email and password for a 24 hour bearer token
#[instrument(skip_all)]
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = request.email.unwrap_or_default();
    let user = if email.is_empty() {
        None
    } else {
        state.users.find_one(&Filter::new().eq("email", email)).await?
    };
    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;

    let password = request.password.unwrap_or_default();
    if !state.credentials.verify(&password, &user.password).await? {
        warn!(user_id = %user.id, "Login rejected: password mismatch");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.sessions.issue(user.id, user.role, user.shelter_ref)?;
    info!(user_id = %user.id, "Admin logged in");
    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}
