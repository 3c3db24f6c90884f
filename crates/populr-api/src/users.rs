use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use populr_db::models::AccountRow;
use populr_types::api::PhoneNumberRequest;

use crate::contacts::normalize_phone;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::{AuthedAccount, PathParam, VndJson};
use crate::state::{AppState, run_blocking};

const SEARCH_LIMIT: u32 = 50;

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Envelope<Vec<AccountRow>>, ApiError> {
    let users = run_blocking(&state, |db| Ok(db.list_accounts()?)).await?;
    Ok(Envelope::ok(users))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _account: AuthedAccount,
    PathParam(id): PathParam<Uuid>,
) -> Result<Envelope<AccountRow>, ApiError> {
    let user = run_blocking(&state, move |db| {
        db.get_account_by_id(id)?.ok_or(ApiError::NoUserForId)
    })
    .await?;
    Ok(Envelope::ok(user))
}

/// GET /searchusers/{term}
pub async fn search_users(
    State(state): State<AppState>,
    _account: AuthedAccount,
    PathParam(term): PathParam<String>,
) -> Result<Envelope<Vec<AccountRow>>, ApiError> {
    let users = run_blocking(&state, move |db| {
        Ok(db.search_accounts(&term.to_lowercase(), SEARCH_LIMIT)?)
    })
    .await?;
    Ok(Envelope::ok(users))
}

/// POST /phone
pub async fn set_phone_number(
    State(state): State<AppState>,
    account: AuthedAccount,
    VndJson(req): VndJson<PhoneNumberRequest>,
) -> Result<Envelope<AccountRow>, ApiError> {
    let phone_number = normalize_phone(&req.phone_number);
    if phone_number.is_empty() {
        return Err(ApiError::BadRequest);
    }

    let user = run_blocking(&state, move |db| {
        db.set_phone_number(account.id, &phone_number)?
            .ok_or(ApiError::NoUserForId)
    })
    .await?;

    info!("{} registered a phone number", user.username);
    Ok(Envelope::ok(user))
}

/// POST /token/{token}: the device push token, not the session token.
pub async fn set_device_token(
    State(state): State<AppState>,
    account: AuthedAccount,
    PathParam(device_token): PathParam<String>,
) -> Result<Envelope<AccountRow>, ApiError> {
    let user = run_blocking(&state, move |db| {
        db.set_device_token(account.id, &device_token)?
            .ok_or(ApiError::NoUserForId)
    })
    .await?;
    Ok(Envelope::ok(user))
}
