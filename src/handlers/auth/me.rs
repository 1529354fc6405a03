// handlers/auth/me.rs - GET /api/auth/me handler

use axum::{Extension, Json};

use crate::middleware::AuthUser;

/// Identity decoded from the bearer token by the access guard
pub async fn me_get(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
