use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use populr_db::models::MessageRow;
use populr_types::api::SendMessageRequest;
use populr_types::models::Ack;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::{AuthedAccount, PathParam, VndJson};
use crate::state::{AppState, run_blocking};

/// POST /message
pub async fn send_message(
    State(state): State<AppState>,
    account: AuthedAccount,
    VndJson(req): VndJson<SendMessageRequest>,
) -> Result<Envelope<MessageRow>, ApiError> {
    let message_id = Uuid::new_v4();
    let recipients = req.recipients.len();

    let message = run_blocking(&state, move |db| {
        Ok(db.send_message(message_id, account.id, &req.recipients, &req.body, &req.kind)?)
    })
    .await?;

    info!("{} sent message {} to {} recipient(s)", account.id, message_id, recipients);
    Ok(Envelope::created(message))
}

/// GET /messages: the caller's inbox, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    account: AuthedAccount,
) -> Result<Envelope<Vec<MessageRow>>, ApiError> {
    let rows = run_blocking(&state, move |db| Ok(db.list_messages(account.id)?)).await?;
    Ok(Envelope::ok(rows))
}

/// POST /readmessage/{id}
pub async fn read_message(
    State(state): State<AppState>,
    account: AuthedAccount,
    PathParam(message_id): PathParam<Uuid>,
) -> Result<Envelope<Ack>, ApiError> {
    run_blocking(&state, move |db| Ok(db.mark_read(message_id, account.id)?)).await?;
    Ok(Envelope::ok(Ack { ok: true }))
}
