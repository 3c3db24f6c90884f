use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use populr_types::api::Resource;
use populr_types::{PublicView, VND_JSON};

use crate::error::ApiError;

/// A successful response: `{"data": <public view of T>}`.
///
/// The payload is always passed through [`PublicView`] before it is
/// serialized, so handlers can hand back raw database rows.
pub struct Envelope<T> {
    status: StatusCode,
    data: T,
}

impl<T: PublicView> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn with_status(status: StatusCode, data: T) -> Self {
        Self { status, data }
    }
}

impl<T: PublicView> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        vnd_json(
            self.status,
            &Resource {
                data: self.data.public_view(),
            },
        )
    }
}

/// Serialize `body` with the vendor media type, whatever the outcome.
pub(crate) fn vnd_json<B: Serialize>(status: StatusCode, body: &B) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(VND_JSON))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            ApiError::InternalServerError.into_response()
        }
    }
}
