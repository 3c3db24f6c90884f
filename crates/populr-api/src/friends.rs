use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use populr_db::GraphError;
use populr_db::models::AccountRow;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::{AuthedAccount, PathParam};
use crate::state::{AppState, run_blocking};

/// POST /friend/{id}: the caller starts following `id`.
pub async fn follow(
    State(state): State<AppState>,
    account: AuthedAccount,
    PathParam(target): PathParam<Uuid>,
) -> Result<Envelope<AccountRow>, ApiError> {
    let followed = run_blocking(&state, move |db| {
        db.create_follow_edge(target, account.id).map_err(|e| match e {
            GraphError::UnknownAccount(_) => ApiError::Friending,
            other => other.into(),
        })
    })
    .await?;

    info!("{} now follows {}", account.id, target);
    Ok(Envelope::created(followed))
}

/// DELETE /unfriend/{id}
pub async fn unfollow(
    State(state): State<AppState>,
    account: AuthedAccount,
    PathParam(target): PathParam<Uuid>,
) -> Result<Envelope<AccountRow>, ApiError> {
    let unfollowed = run_blocking(&state, move |db| {
        db.remove_follow_edge(target, account.id).map_err(|e| match e {
            // No such account means no such edge.
            GraphError::UnknownAccount(_) => ApiError::NotFriends,
            other => other.into(),
        })
    })
    .await?;

    info!("{} unfollowed {}", account.id, target);
    Ok(Envelope::ok(unfollowed))
}

/// GET /followers
pub async fn followers(
    State(state): State<AppState>,
    account: AuthedAccount,
) -> Result<Envelope<Vec<AccountRow>>, ApiError> {
    let rows = run_blocking(&state, move |db| Ok(db.list_followers(account.id)?)).await?;
    Ok(Envelope::ok(rows))
}

/// GET /following
pub async fn following(
    State(state): State<AppState>,
    account: AuthedAccount,
) -> Result<Envelope<Vec<AccountRow>>, ApiError> {
    let rows = run_blocking(&state, move |db| Ok(db.list_following(account.id)?)).await?;
    Ok(Envelope::ok(rows))
}
