use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin context attached to guarded requests
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub shelter_id: Uuid,
}

impl AuthUser {
    fn from_claims(claims: Claims) -> Option<Self> {
        Some(Self {
            id: claims.id,
            role: claims.known_role()?,
            shelter_id: claims.shelter_id,
        })
    }
}

/// Access guard: requires a valid bearer token carrying an admin role.
/// Performs no I/O; the decoded identity is stored as an `AuthUser`
/// request extension.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Not authorized, no token"))?;

    let claims = state.sessions.verify(token).map_err(|err| {
        warn!("Rejected bearer token: {}", err);
        ApiError::unauthorized("Not authorized, token failed")
    })?;

    let auth_user = AuthUser::from_claims(claims)
        .ok_or_else(|| ApiError::forbidden("Not authorized as an admin"))?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer")
        .map(str::trim)
}
