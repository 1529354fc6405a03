// handlers/mod.rs - Request handlers, one module per resource
//
// Every route is public except GET /api/auth/me, which sits behind the
// admin access guard.

pub mod applications;
pub mod auth;
pub mod health;
pub mod pets;
pub mod shelters;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;
use crate::media::MediaError;

/// JSON body extractor whose rejections render as `{"message": ...}`
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejections render as `{"message": ...}`
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Multipart extractor. A request that is not `multipart/form-data` carries
/// no image, so it is rejected the same way as a form without one.
pub struct FormData(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(request, state).await.map_err(|rejection| {
            tracing::debug!("Multipart rejected: {}", rejection.body_text());
            ApiError::from(MediaError::Missing)
        })?;
        Ok(Self(multipart))
    }
}

/// Path identities that are not UUIDs cannot name a record
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
