//! The request chain.
//!
//! Every route runs, outermost first: panic recovery, request timing, the
//! `Accept` check, the `Content-Type` check (routes that read a body, and all
//! guarded routes), then the auth guard. Any stage may answer with a catalog
//! error, in which case nothing after it runs. Body decoding and path
//! parameters are typed extractors on the handler (see [`crate::extract`]),
//! so they run after the last middleware and before the handler body.

use std::any::Any;
use std::time::Instant;

use axum::{
    Router,
    extract::{Request, State},
    http::header::{self, AsHeaderName},
    middleware::{Next, from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use populr_types::VND_JSON;

use crate::error::ApiError;
use crate::extract::AuthedAccount;
use crate::state::{AppState, run_blocking};

/// Header naming the account the client claims to be.
pub const X_KEY: &str = "x-key";
/// Header carrying the account's rotating session token.
pub const NEW_TOKEN: &str = "new-token";

// -- Chains --

/// Recovery and timing around everything, including unmatched routes.
pub fn outer<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(from_fn(log_request)),
    )
}

/// Public routes without a body.
pub fn open<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn(require_accept))
}

/// Public routes that decode a body.
pub fn open_with_body<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(
        ServiceBuilder::new()
            .layer(from_fn(require_accept))
            .layer(from_fn(require_content_type)),
    )
}

/// Routes that require a proven account.
pub fn guarded(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(
        ServiceBuilder::new()
            .layer(from_fn(require_accept))
            .layer(from_fn(require_content_type))
            .layer(from_fn_with_state(state, require_auth)),
    )
}

// -- Stages --

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("panic: {}", detail);
    ApiError::InternalServerError.into_response()
}

pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        "[{}] {:?} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

pub async fn require_accept(req: Request, next: Next) -> Result<Response, ApiError> {
    if header_str(&req, header::ACCEPT) != Some(VND_JSON) {
        return Err(ApiError::NotAcceptable);
    }
    Ok(next.run(req).await)
}

pub async fn require_content_type(req: Request, next: Next) -> Result<Response, ApiError> {
    let content_type = header_str(&req, header::CONTENT_TYPE);
    if content_type != Some(VND_JSON) {
        warn!("Bad Content-Type: {:?}", content_type);
        return Err(ApiError::UnsupportedMediaType);
    }
    Ok(next.run(req).await)
}

/// Two-stage credential check: `x-key` names the account, `new-token` must
/// equal that account's stored token. Validates only; never rotates.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(key) = header_str(&req, X_KEY) else {
        warn!("No x-key passed");
        return Err(ApiError::NoXKey);
    };
    let key = key.to_owned();

    let Some(token) = header_str(&req, NEW_TOKEN) else {
        warn!("No token passed for {}", key);
        return Err(ApiError::NoToken);
    };
    let token = token.to_owned();

    // An id that cannot exist has no live token to match.
    let account_id: Uuid = key.parse().map_err(|_| {
        warn!("Malformed x-key {:?}", key);
        ApiError::BadToken
    })?;

    let stored = run_blocking(&state, move |db| Ok(db.get_token(account_id)?)).await?;
    let live = stored.is_some_and(|stored| bool::from(stored.as_bytes().ct_eq(token.as_bytes())));
    if !live {
        warn!("Bad token for {}", account_id);
        return Err(ApiError::BadToken);
    }

    req.extensions_mut().insert(AuthedAccount { id: account_id });
    Ok(next.run(req).await)
}

/// A header's value, treating absent, empty and non-UTF-8 values alike.
fn header_str<K: AsHeaderName>(req: &Request, name: K) -> Option<&str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
