//! Typed per-request values: the decoded body, path parameters and the
//! authenticated account. All rejections use the catalog envelope.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// Request body decoded strictly as `T`. Anything that does not parse as
/// `T` (bad syntax, wrong shape, unknown fields) is `bad_request`.
#[derive(Debug)]
pub struct VndJson<T>(pub T);

impl<T, S> FromRequest<S> for VndJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            warn!("Failed to read request body: {}", e);
            ApiError::BadRequest
        })?;
        decode(&bytes).map(VndJson)
    }
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!("Malformed request body: {}", e);
        ApiError::BadRequest
    })
}

/// A path parameter; a value that does not parse is `bad_request`.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                warn!("Bad path parameter: {}", e);
                ApiError::BadRequest
            })?;
        Ok(PathParam(value))
    }
}

/// The account proven by the auth guard for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthedAccount {
    pub id: Uuid,
}

impl<S> FromRequestParts<S> for AuthedAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthedAccount>().copied().ok_or_else(|| {
            error!("Handler expects an authenticated account but the route is not guarded");
            ApiError::InternalServerError
        })
    }
}
